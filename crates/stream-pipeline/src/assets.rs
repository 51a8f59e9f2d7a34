//! Model and label assets

use classification::{ClassificationError, LabelTable};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::target::ExecutionTarget;
use crate::PipelineError;

/// Asset locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory holding the model files and the label file
    pub model_dir: PathBuf,
    /// Label file name inside `model_dir`
    pub label_file: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("tflite_model"),
            label_file: "labels.txt".to_string(),
        }
    }
}

/// Model path and label table checked at startup
#[derive(Debug, Clone)]
pub struct ModelAssets {
    pub target: ExecutionTarget,
    pub model_path: PathBuf,
    pub label_path: PathBuf,
    pub labels: LabelTable,
}

impl ModelAssets {
    /// Check the model for `target` exists and load the label table
    pub fn resolve(config: &AssetsConfig, target: ExecutionTarget) -> Result<Self, PipelineError> {
        let model_path = config.model_dir.join(target.model_file());
        require_model(&model_path)?;

        let label_path = config.model_dir.join(&config.label_file);
        let labels = LabelTable::load(&label_path).inspect_err(|err| error!("{}", err))?;

        info!(
            "Resolved model assets: target={:?}, model={}, labels={}",
            target,
            model_path.display(),
            labels.len()
        );

        Ok(Self {
            target,
            model_path,
            label_path,
            labels,
        })
    }
}

fn require_model(path: &Path) -> Result<(), PipelineError> {
    if path.is_file() {
        return Ok(());
    }
    error!("Cannot find tflite model [{}]", path.display());
    Err(ClassificationError::ResourceNotFound {
        resource: "tflite model",
        path: path.to_path_buf(),
    }
    .into())
}
