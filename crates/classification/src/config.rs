//! Classification configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::scores::TensorType;
use crate::ClassificationError;

/// Classification configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Overlay refresh period (milliseconds)
    pub refresh_interval_ms: u64,

    /// Top score must be strictly greater than this to count as a classification
    pub min_score: f64,

    /// Element type of the tensors delivered by the inference stage
    pub tensor_type: TensorType,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 500,
            min_score: 0.0,
            tensor_type: TensorType::Uint8,
        }
    }
}

impl ClassificationConfig {
    /// Overlay refresh period
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    /// Reject settings the refresh timer or evaluator cannot work with
    pub fn validate(&self) -> Result<(), ClassificationError> {
        if self.refresh_interval_ms == 0 {
            return Err(ClassificationError::InvalidConfig(
                "refresh_interval_ms must be greater than zero".to_string(),
            ));
        }
        if !self.min_score.is_finite() {
            return Err(ClassificationError::InvalidConfig(format!(
                "min_score must be finite, got {}",
                self.min_score
            )));
        }
        Ok(())
    }
}
