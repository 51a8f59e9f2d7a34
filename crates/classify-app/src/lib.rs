//! Live Image Classification Demo
//!
//! Camera frames run through a tensor filter; the top label is shown in a
//! text overlay refreshed on a fixed period.

pub mod cli;
pub mod settings;

pub use cli::Cli;
pub use settings::Settings;

use anyhow::Context;
use classification::ClassificationContext;
use std::sync::Arc;
use stream_pipeline::{ModelAssets, Termination};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging; `RUST_LOG` overrides the default `info` level
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Resolve assets, start the pipeline and refresh the overlay until the stream ends
pub async fn run(settings: Settings) -> anyhow::Result<Termination> {
    settings
        .classification
        .validate()
        .context("Invalid classification settings")?;

    let assets = ModelAssets::resolve(&settings.assets, settings.target)
        .context("Failed to initialize model assets")?;

    let description = settings.pipeline.describe(&assets.model_path, assets.target);
    let context = Arc::new(ClassificationContext::new(
        assets.labels,
        settings.classification,
    ));

    info!("Starting classification on {:?}", assets.target);
    run_pipeline(&description, context).await
}

/// Log how the pipeline ended; returns true for a clean end-of-stream
pub fn report_termination(termination: &Termination) -> bool {
    match termination {
        Termination::EndOfStream => {
            info!("Stream finished");
            true
        }
        Termination::Error {
            message,
            debug: details,
        } => {
            warn!("Pipeline stopped on error: {} ({:?})", message, details);
            false
        }
    }
}

#[cfg(feature = "gstreamer")]
async fn run_pipeline(
    description: &str,
    context: Arc<ClassificationContext>,
) -> anyhow::Result<Termination> {
    use stream_pipeline::gst::GstPipeline;
    use stream_pipeline::Session;

    let (pipeline, overlay, events) = GstPipeline::launch(description, Arc::clone(&context))
        .context("Failed to start pipeline")?;
    let termination = Session::new(context).run(events, overlay).await;
    pipeline.shutdown()?;

    Ok(termination)
}

#[cfg(not(feature = "gstreamer"))]
async fn run_pipeline(
    description: &str,
    _context: Arc<ClassificationContext>,
) -> anyhow::Result<Termination> {
    tracing::debug!("Pipeline: {}", description);
    anyhow::bail!("nnclassify was built without the `gstreamer` feature")
}

#[cfg(test)]
mod tests {
    use super::*;
    use classification::ClassificationError;
    use std::fs;
    use stream_pipeline::{AssetsConfig, ExecutionTarget, PipelineError};

    fn settings(dir: &tempfile::TempDir) -> Settings {
        Settings {
            target: ExecutionTarget::Cpu,
            assets: AssetsConfig {
                model_dir: dir.path().to_path_buf(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_report_termination() {
        assert!(report_termination(&Termination::EndOfStream));
        assert!(!report_termination(&Termination::Error {
            message: "Could not open device".to_string(),
            debug: Some("v4l2src0".to_string()),
        }));
    }

    #[tokio::test]
    async fn test_missing_labels_abort_startup() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(ExecutionTarget::Cpu.model_file()), b"TFL3").unwrap();

        let err = run(settings(&dir)).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::Assets(ClassificationError::ResourceNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_invalid_settings_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings(&dir);
        settings.classification.refresh_interval_ms = 0;

        let err = run(settings).await.unwrap_err();
        assert!(err.downcast_ref::<ClassificationError>().is_some());
    }

    #[cfg(not(feature = "gstreamer"))]
    #[tokio::test]
    async fn test_requires_gstreamer_backend() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(ExecutionTarget::Cpu.model_file()), b"TFL3").unwrap();
        fs::write(dir.path().join("labels.txt"), "background\ntench\n").unwrap();

        let err = run(settings(&dir)).await.unwrap_err();
        assert!(err.to_string().contains("gstreamer"));
    }
}
