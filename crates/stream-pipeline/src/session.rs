//! Overlay Refresh Session

use classification::{ClassificationContext, RefreshGate, RefreshOutcome};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::events::{PipelineEvent, Termination};
use crate::overlay::OverlaySink;

/// Bus events buffered between the pipeline and the session
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Drives the refresh gate on a fixed period until the pipeline terminates
pub struct Session {
    gate: RefreshGate,
    period: Duration,
}

impl Session {
    /// Create a session using the context's configured refresh interval
    pub fn new(context: Arc<ClassificationContext>) -> Self {
        let period = context.config().refresh_interval();
        Self {
            gate: RefreshGate::new(context),
            period,
        }
    }

    /// Create a channel pair for feeding pipeline events into the session
    pub fn channel() -> (mpsc::Sender<PipelineEvent>, mpsc::Receiver<PipelineEvent>) {
        mpsc::channel(EVENT_CHANNEL_CAPACITY)
    }

    /// Run until end-of-stream, a pipeline error, or the event channel closing.
    ///
    /// The classification context is stopped before returning.
    pub async fn run<O: OverlaySink>(
        mut self,
        mut events: mpsc::Receiver<PipelineEvent>,
        overlay: O,
    ) -> Termination {
        info!("Starting overlay refresh session: period={:?}", self.period);

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let termination = loop {
            tokio::select! {
                biased;

                event = events.recv() => match event {
                    Some(event) => {
                        if let Some(termination) = Self::handle_event(event) {
                            break termination;
                        }
                    }
                    None => {
                        debug!("Pipeline event channel closed");
                        break Termination::EndOfStream;
                    }
                },
                _ = ticker.tick() => {
                    if let RefreshOutcome::Update(label) = self.gate.refresh() {
                        overlay.set_text(&label);
                    }
                }
            }
        };

        let context = self.gate.context();
        context.stop();

        let stats = context.stats();
        info!(
            "Overlay refresh session stopped: frames={}, size_mismatches={}, malformed={}, overlay_updates={}",
            stats.frames_evaluated,
            stats.size_mismatches,
            stats.malformed_tensors,
            stats.overlay_updates
        );

        termination
    }

    fn handle_event(event: PipelineEvent) -> Option<Termination> {
        match &event {
            PipelineEvent::StreamStarted => info!("Received start message"),
            PipelineEvent::EndOfStream => info!("Received eos message"),
            PipelineEvent::Error {
                message,
                debug: details,
            } => warn!("[error] {} : {:?}", message, details),
            PipelineEvent::Warning {
                message,
                debug: details,
            } => warn!("[warning] {} : {:?}", message, details),
            PipelineEvent::Qos {
                format,
                processed,
                dropped,
            } => debug!(
                "[qos] format[{}] processed[{}] dropped[{}]",
                format, processed, dropped
            ),
        }
        event.termination()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classification::{ClassificationConfig, Decision, LabelTable};
    use std::sync::Mutex;
    use tokio::time::sleep;

    #[derive(Clone, Default)]
    struct RecordingOverlay(Arc<Mutex<Vec<String>>>);

    impl RecordingOverlay {
        fn texts(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl OverlaySink for RecordingOverlay {
        fn set_text(&self, text: &str) {
            self.0.lock().unwrap().push(text.to_string());
        }
    }

    fn context(labels: &[&str]) -> Arc<ClassificationContext> {
        Arc::new(ClassificationContext::new(
            LabelTable::from_labels(labels.iter().copied()),
            ClassificationConfig::default(),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_refreshes_on_period() {
        let ctx = context(&["a", "b", "c"]);
        let overlay = RecordingOverlay::default();
        let (tx, rx) = Session::channel();

        let session = tokio::spawn(Session::new(Arc::clone(&ctx)).run(rx, overlay.clone()));

        ctx.submit_scores(&[0.2f32, 0.5, 0.3]);
        sleep(Duration::from_millis(250)).await;
        assert_eq!(overlay.texts(), vec!["b"]);

        // Same top class: no rewrite on the next tick
        ctx.submit_scores(&[0.1f32, 0.6, 0.3]);
        sleep(Duration::from_millis(500)).await;
        assert_eq!(overlay.texts(), vec!["b"]);

        ctx.submit_scores(&[0.9f32, 0.05, 0.05]);
        sleep(Duration::from_millis(500)).await;
        assert_eq!(overlay.texts(), vec!["b", "a"]);

        tx.send(PipelineEvent::EndOfStream).await.unwrap();
        assert_eq!(session.await.unwrap(), Termination::EndOfStream);
        assert!(!ctx.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlay_lags_by_at_most_one_period() {
        let ctx = context(&["a", "b"]);
        let overlay = RecordingOverlay::default();
        let (tx, rx) = Session::channel();

        let session = tokio::spawn(Session::new(Arc::clone(&ctx)).run(rx, overlay.clone()));
        sleep(Duration::from_millis(100)).await;

        ctx.submit_scores(&[0u8, 7]);
        assert!(overlay.texts().is_empty());

        sleep(Duration::from_millis(500)).await;
        assert_eq!(overlay.texts(), vec!["b"]);

        drop(tx);
        assert_eq!(session.await.unwrap(), Termination::EndOfStream);
    }

    #[test]
    fn test_handle_event_logs_details() {
        let warning = PipelineEvent::Warning {
            message: "buffer late".to_string(),
            debug: Some("gstbasesink.c: dropping".to_string()),
        };
        assert_eq!(Session::handle_event(warning), None);

        let error = PipelineEvent::Error {
            message: "Internal data stream error".to_string(),
            debug: Some("streaming stopped, reason not-negotiated".to_string()),
        };
        assert_eq!(
            Session::handle_event(error),
            Some(Termination::Error {
                message: "Internal data stream error".to_string(),
                debug: Some("streaming stopped, reason not-negotiated".to_string()),
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_terminates() {
        let ctx = context(&["a", "b"]);
        let (tx, rx) = Session::channel();

        let session = tokio::spawn(Session::new(Arc::clone(&ctx)).run(rx, RecordingOverlay::default()));

        tx.send(PipelineEvent::StreamStarted).await.unwrap();
        tx.send(PipelineEvent::Warning {
            message: "buffer late".to_string(),
            debug: None,
        })
        .await
        .unwrap();
        tx.send(PipelineEvent::Error {
            message: "Could not open device".to_string(),
            debug: Some("v4l2src".to_string()),
        })
        .await
        .unwrap();

        let termination = session.await.unwrap();
        assert_eq!(
            termination,
            Termination::Error {
                message: "Could not open device".to_string(),
                debug: Some("v4l2src".to_string()),
            }
        );

        // Late callbacks after stop are ignored
        ctx.submit_scores(&[0u8, 9]);
        assert_eq!(ctx.latest(), Decision::None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_terminal_events_keep_running() {
        let ctx = context(&["a"]);
        let (tx, rx) = Session::channel();

        let session = tokio::spawn(Session::new(Arc::clone(&ctx)).run(rx, RecordingOverlay::default()));

        tx.send(PipelineEvent::Qos {
            format: "Buffers".to_string(),
            processed: 120,
            dropped: 3,
        })
        .await
        .unwrap();
        sleep(Duration::from_millis(1000)).await;
        assert!(ctx.is_running());

        tx.send(PipelineEvent::EndOfStream).await.unwrap();
        session.await.unwrap();
        assert!(!ctx.is_running());
    }
}
