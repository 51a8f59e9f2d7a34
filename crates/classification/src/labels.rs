//! Label table loading and lookup

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::info;

use crate::scores::Decision;
use crate::ClassificationError;

/// Ordered class labels, index = class index of the model output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    /// Load labels from a text file, one label per line
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClassificationError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => ClassificationError::ResourceNotFound {
                resource: "label file",
                path: path.to_path_buf(),
            },
            _ => ClassificationError::ResourceRead {
                resource: "label file",
                path: path.to_path_buf(),
                source: err,
            },
        })?;

        let table = Self::parse(&contents);
        if table.is_empty() {
            return Err(ClassificationError::EmptyLabelTable(path.to_path_buf()));
        }

        info!("Finished loading labels, total [{}]", table.len());
        Ok(table)
    }

    /// Split label text into lines. Only the line terminator is removed.
    pub fn parse(contents: &str) -> Self {
        Self {
            labels: contents.lines().map(str::to_string).collect(),
        }
    }

    /// Build a table from in-memory labels
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of labels
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label at `index`, or an empty string when out of range
    pub fn get(&self, index: usize) -> &str {
        self.labels.get(index).map(String::as_str).unwrap_or("")
    }

    /// Label shown for a decision; `Decision::None` maps to an empty string
    pub fn label_for(&self, decision: Decision) -> &str {
        match decision {
            Decision::Class(index) => self.get(index),
            Decision::None => "",
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}
