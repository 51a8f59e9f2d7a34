//! Overlay refresh gating

use std::sync::Arc;
use tracing::debug;

use crate::scores::Decision;
use crate::tracker::ClassificationContext;

/// Result of one refresh tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Displayed label is already current
    Unchanged,
    /// Overlay text should become this label (empty for no classification)
    Update(String),
}

/// Decides on each timer tick whether the overlay text needs rewriting
#[derive(Debug)]
pub struct RefreshGate {
    context: Arc<ClassificationContext>,
    displayed: Decision,
}

impl RefreshGate {
    pub fn new(context: Arc<ClassificationContext>) -> Self {
        Self {
            context,
            displayed: Decision::None,
        }
    }

    /// Decision currently shown on the overlay
    pub fn displayed(&self) -> Decision {
        self.displayed
    }

    pub fn context(&self) -> &Arc<ClassificationContext> {
        &self.context
    }

    /// Compare the displayed decision with the latest one and emit an update on change
    pub fn refresh(&mut self) -> RefreshOutcome {
        if !self.context.is_running() {
            return RefreshOutcome::Unchanged;
        }

        let latest = self.context.latest();
        if latest == self.displayed {
            return RefreshOutcome::Unchanged;
        }

        self.displayed = latest;
        self.context.record_overlay_update();

        let label = self.context.labels().label_for(latest);
        debug!("Overlay label changed to {:?} ({:?})", label, latest);
        RefreshOutcome::Update(label.to_string())
    }
}
