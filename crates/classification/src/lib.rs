//! Live Classification Result Tracking
//!
//! Turns per-frame inference score buffers into an on-screen label:
//! - Label table loading (one label per line, line order = class index)
//! - Arg-max score evaluation with a configurable confidence floor
//! - Latest-value-wins decision slot shared between the inference callback
//!   and the overlay refresh timer
//! - Refresh gating so the overlay is only rewritten when the label changes

pub mod config;
pub mod gate;
pub mod labels;
pub mod scores;
pub mod tracker;

pub use config::ClassificationConfig;
pub use gate::{RefreshGate, RefreshOutcome};
pub use labels::LabelTable;
pub use scores::{evaluate, Decision, TensorType};
pub use tracker::{ClassificationContext, ClassificationStats};

use std::path::PathBuf;
use thiserror::Error;

/// Classification error types
#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("Cannot find {resource} [{}]", .path.display())]
    ResourceNotFound {
        resource: &'static str,
        path: PathBuf,
    },

    #[error("Failed to read {resource} [{}]: {source}", .path.display())]
    ResourceRead {
        resource: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Label file [{}] contains no labels", .0.display())]
    EmptyLabelTable(PathBuf),

    #[error("Unexpected data size: expected {expected} scores, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Malformed tensor: {len} bytes is not a multiple of {element_size}")]
    MalformedTensor { len: usize, element_size: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
