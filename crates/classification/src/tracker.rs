//! Shared classification state
//!
//! The inference callback writes the latest decision, the overlay refresh
//! timer reads it. The two may run on different threads, so the decision is
//! kept in a single atomic slot: the latest value wins and intermediate
//! decisions may be dropped.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use tracing::{debug, info, warn};

use crate::config::ClassificationConfig;
use crate::labels::LabelTable;
use crate::scores::{evaluate, Decision};
use crate::ClassificationError;

/// Slot encoding for `Decision::None`
const NO_CLASS: usize = usize::MAX;

/// Single-writer/single-reader mailbox holding the latest decision
#[derive(Debug)]
struct DecisionSlot(AtomicUsize);

impl DecisionSlot {
    fn new() -> Self {
        Self(AtomicUsize::new(NO_CLASS))
    }

    fn store(&self, decision: Decision) {
        let raw = decision.index().unwrap_or(NO_CLASS);
        self.0.store(raw, Ordering::Release);
    }

    fn load(&self) -> Decision {
        match self.0.load(Ordering::Acquire) {
            NO_CLASS => Decision::None,
            index => Decision::Class(index),
        }
    }
}

/// Counter snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassificationStats {
    /// Score buffers evaluated while running
    pub frames_evaluated: u64,
    /// Buffers whose length disagreed with the label table
    pub size_mismatches: u64,
    /// Tensors that could not be decoded
    pub malformed_tensors: u64,
    /// Overlay text changes emitted by the refresh gate
    pub overlay_updates: u64,
}

/// Classification state shared by the inference callback and the refresh timer
#[derive(Debug)]
pub struct ClassificationContext {
    labels: LabelTable,
    config: ClassificationConfig,
    latest: DecisionSlot,
    running: AtomicBool,
    frames_evaluated: AtomicU64,
    size_mismatches: AtomicU64,
    malformed_tensors: AtomicU64,
    overlay_updates: AtomicU64,
}

impl ClassificationContext {
    /// Create a running context
    pub fn new(labels: LabelTable, config: ClassificationConfig) -> Self {
        info!(
            "Creating classification context: labels={}, refresh={}ms, min_score={}, tensor={:?}",
            labels.len(),
            config.refresh_interval_ms,
            config.min_score,
            config.tensor_type
        );
        Self {
            labels,
            config,
            latest: DecisionSlot::new(),
            running: AtomicBool::new(true),
            frames_evaluated: AtomicU64::new(0),
            size_mismatches: AtomicU64::new(0),
            malformed_tensors: AtomicU64::new(0),
            overlay_updates: AtomicU64::new(0),
        }
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn config(&self) -> &ClassificationConfig {
        &self.config
    }

    /// Evaluate a decoded score buffer and publish the result
    pub fn submit_scores<S>(&self, scores: &[S])
    where
        S: Copy + Into<f64>,
    {
        if !self.is_running() {
            debug!("Ignoring score buffer after stop");
            return;
        }
        let result = evaluate(scores, self.labels.len(), self.config.min_score);
        self.publish(result);
    }

    /// Decode a raw output tensor per the configured tensor type and publish the result
    pub fn submit_tensor(&self, data: &[u8]) {
        if !self.is_running() {
            debug!("Ignoring tensor after stop");
            return;
        }
        let result =
            self.config
                .tensor_type
                .evaluate(data, self.labels.len(), self.config.min_score);
        self.publish(result);
    }

    fn publish(&self, result: Result<Decision, ClassificationError>) {
        self.frames_evaluated.fetch_add(1, Ordering::Relaxed);

        let decision = match result {
            Ok(decision) => decision,
            Err(err) => {
                match &err {
                    ClassificationError::SizeMismatch { .. } => {
                        self.size_mismatches.fetch_add(1, Ordering::Relaxed);
                    }
                    ClassificationError::MalformedTensor { .. } => {
                        self.malformed_tensors.fetch_add(1, Ordering::Relaxed);
                    }
                    _ => {}
                }
                warn!("Discarding frame result: {}", err);
                Decision::None
            }
        };

        debug!("Latest decision: {:?}", decision);
        self.latest.store(decision);
    }

    /// Most recently computed decision
    pub fn latest(&self) -> Decision {
        self.latest.load()
    }

    /// Stop accepting score buffers. Returns false if already stopped.
    pub fn stop(&self) -> bool {
        let was_running = self.running.swap(false, Ordering::AcqRel);
        if was_running {
            info!("Classification stopped");
        }
        was_running
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub(crate) fn record_overlay_update(&self) {
        self.overlay_updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> ClassificationStats {
        ClassificationStats {
            frames_evaluated: self.frames_evaluated.load(Ordering::Relaxed),
            size_mismatches: self.size_mismatches.load(Ordering::Relaxed),
            malformed_tensors: self.malformed_tensors.load(Ordering::Relaxed),
            overlay_updates: self.overlay_updates.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scores::TensorType;
    use std::sync::Arc;
    use std::thread;

    fn context(labels: &[&str]) -> ClassificationContext {
        ClassificationContext::new(
            LabelTable::from_labels(labels.iter().copied()),
            ClassificationConfig::default(),
        )
    }

    #[test]
    fn test_starts_without_decision() {
        let ctx = context(&["a", "b"]);
        assert!(ctx.is_running());
        assert_eq!(ctx.latest(), Decision::None);
    }

    #[test]
    fn test_latest_value_wins() {
        let ctx = context(&["a", "b", "c"]);
        ctx.submit_scores(&[0.2f32, 0.5, 0.3]);
        ctx.submit_scores(&[0.9f32, 0.05, 0.05]);

        assert_eq!(ctx.latest(), Decision::Class(0));
        assert_eq!(ctx.stats().frames_evaluated, 2);
    }

    #[test]
    fn test_size_mismatch_resets_to_none() {
        let ctx = context(&["a", "b", "c"]);
        ctx.submit_scores(&[0.2f32, 0.5, 0.3]);
        ctx.submit_scores(&[0.2f32, 0.5]);

        assert_eq!(ctx.latest(), Decision::None);
        assert_eq!(ctx.stats().size_mismatches, 1);
    }

    #[test]
    fn test_malformed_tensor_counted() {
        let ctx = ClassificationContext::new(
            LabelTable::from_labels(["a", "b"]),
            ClassificationConfig {
                tensor_type: TensorType::Float32,
                ..Default::default()
            },
        );
        ctx.submit_tensor(&[0u8; 5]);

        assert_eq!(ctx.latest(), Decision::None);
        assert_eq!(ctx.stats().malformed_tensors, 1);
    }

    #[test]
    fn test_quantized_tensor_submission() {
        let ctx = context(&["background", "tench", "goldfish"]);
        ctx.submit_tensor(&[0, 12, 240]);
        assert_eq!(ctx.latest(), Decision::Class(2));
    }

    #[test]
    fn test_submissions_after_stop_ignored() {
        let ctx = context(&["a", "b"]);
        ctx.submit_scores(&[1u8, 2]);

        assert!(ctx.stop());
        assert!(!ctx.stop());

        ctx.submit_scores(&[9u8, 2]);
        ctx.submit_tensor(&[9, 2]);

        assert!(!ctx.is_running());
        assert_eq!(ctx.latest(), Decision::Class(1));
        assert_eq!(ctx.stats().frames_evaluated, 1);
    }

    #[test]
    fn test_writer_on_another_thread() {
        let ctx = Arc::new(context(&["a", "b", "c", "d"]));

        let writer = {
            let ctx = Arc::clone(&ctx);
            thread::spawn(move || {
                for i in 0..1000u32 {
                    let mut scores = [0u8; 4];
                    scores[(i % 4) as usize] = 1;
                    ctx.submit_scores(&scores);
                }
            })
        };

        for _ in 0..1000 {
            assert!(matches!(ctx.latest(), Decision::None | Decision::Class(0..=3)));
        }
        writer.join().unwrap();

        assert_eq!(ctx.latest(), Decision::Class(3));
        assert_eq!(ctx.stats().frames_evaluated, 1000);
    }
}
