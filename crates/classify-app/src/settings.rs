//! Layered application settings
//!
//! Defaults, then an optional settings file, then `NNCLASSIFY__*` environment
//! variables, then command line flags.

use classification::ClassificationConfig;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use stream_pipeline::{AssetsConfig, ExecutionTarget, PipelineConfig};

use crate::cli::Cli;

/// Environment variable prefix, e.g. `NNCLASSIFY__CLASSIFICATION__MIN_SCORE`
pub const ENV_PREFIX: &str = "NNCLASSIFY";

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub target: ExecutionTarget,
    pub classification: ClassificationConfig,
    pub assets: AssetsConfig,
    pub pipeline: PipelineConfig,
}

impl Settings {
    /// Load settings from the optional file and the process environment
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(file, environment())
    }

    fn load_with(file: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder.add_source(env).build()?.try_deserialize()
    }

    /// Apply command line overrides.
    ///
    /// A relative model directory from defaults or the settings file is taken
    /// relative to the executable; `--model-dir` is taken as given.
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if self.assets.model_dir.is_relative() {
            if let Some(dir) = executable_dir() {
                self.assets.model_dir = dir.join(&self.assets.model_dir);
            }
        }
        if let Some(dir) = &cli.model_dir {
            self.assets.model_dir = dir.clone();
        }
        if cli.cpu {
            self.target = ExecutionTarget::Cpu;
        }
        if let Some(ms) = cli.refresh_ms {
            self.classification.refresh_interval_ms = ms;
        }
        if let Some(device) = &cli.device {
            self.pipeline.camera_device = Some(device.clone());
        }
        self
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

fn executable_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}
