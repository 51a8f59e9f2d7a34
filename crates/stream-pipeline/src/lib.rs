//! Classification Pipeline Wiring
//!
//! Everything around the classification core that talks to the outside world:
//! - Execution target selection (CPU vs. NPU delegate)
//! - Model and label asset resolution
//! - Pipeline launch description (camera, display branch, tensor branch)
//! - Pipeline bus events and the overlay refresh session
//! - GStreamer backend (`gstreamer` feature)

pub mod assets;
pub mod description;
pub mod events;
pub mod overlay;
pub mod session;
pub mod target;

#[cfg(feature = "gstreamer")]
pub mod gst;

pub use assets::{AssetsConfig, ModelAssets};
pub use description::{PipelineConfig, OVERLAY_ELEMENT, TENSOR_SINK_ELEMENT};
pub use events::{PipelineEvent, Termination};
pub use overlay::OverlaySink;
pub use session::Session;
pub use target::ExecutionTarget;

use classification::ClassificationError;
use thiserror::Error;

/// Pipeline error types
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Assets(#[from] ClassificationError),

    #[error("Pipeline initialization failed: {0}")]
    Init(String),

    #[error("Failed to launch pipeline: {0}")]
    Launch(String),

    #[error("Pipeline element not found: {0}")]
    MissingElement(&'static str),

    #[error("Pipeline state change failed: {0}")]
    StateChange(String),
}
