use std::time::Duration;

use serde::Deserialize;

use crate::config::app_config::ConfigError;
use crate::expression::domain::expression_classifier::ClassifierThresholds;
use crate::shared::constants::{
    DEFAULT_BASELINE_ALPHA, DEFAULT_COOLDOWN_SECS, DEFAULT_DETECTION_CONFIDENCE,
    DEFAULT_EXPRESSION_THRESHOLD, DEFAULT_HOLD_SAMPLE_SECS, DEFAULT_WINK_OPEN_RATIO,
    WINK_OPEN_MARGIN,
};

/// Tunables from the `settings` section. Every key is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub detection_confidence: f64,
    pub expression_threshold: f64,
    pub cooldown_seconds: f64,
    /// Derived from `expression_threshold` when absent; see
    /// [`Settings::wink_open_ratio`].
    pub wink_open_ratio: Option<f64>,
    pub baseline_alpha: f64,
    pub hold_sample_seconds: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            detection_confidence: DEFAULT_DETECTION_CONFIDENCE,
            expression_threshold: DEFAULT_EXPRESSION_THRESHOLD,
            cooldown_seconds: DEFAULT_COOLDOWN_SECS,
            wink_open_ratio: None,
            baseline_alpha: DEFAULT_BASELINE_ALPHA,
            hold_sample_seconds: DEFAULT_HOLD_SAMPLE_SECS,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &'static str, reason: String| -> Result<(), ConfigError> {
            Err(ConfigError::Invalid { key, reason })
        };

        if !(0.0..=1.0).contains(&self.detection_confidence) {
            return invalid(
                "detection_confidence",
                format!("must be between 0.0 and 1.0, got {}", self.detection_confidence),
            );
        }
        if !(self.expression_threshold.is_finite() && self.expression_threshold > 0.0) {
            return invalid(
                "expression_threshold",
                format!("must be positive, got {}", self.expression_threshold),
            );
        }
        if Duration::try_from_secs_f64(self.cooldown_seconds).is_err() {
            return invalid(
                "cooldown_seconds",
                format!("must be a non-negative number of seconds, got {}", self.cooldown_seconds),
            );
        }
        if let Some(open) = self.wink_open_ratio {
            if !(open.is_finite() && open > self.expression_threshold) {
                return invalid(
                    "wink_open_ratio",
                    format!(
                        "must be greater than expression_threshold ({}), got {open}",
                        self.expression_threshold
                    ),
                );
            }
        }
        if !(self.baseline_alpha > 0.0 && self.baseline_alpha <= 1.0) {
            return invalid(
                "baseline_alpha",
                format!("must be in (0.0, 1.0], got {}", self.baseline_alpha),
            );
        }
        if Duration::try_from_secs_f64(self.hold_sample_seconds).is_err() {
            return invalid(
                "hold_sample_seconds",
                format!(
                    "must be a non-negative number of seconds, got {}",
                    self.hold_sample_seconds
                ),
            );
        }
        Ok(())
    }

    /// Zero for a value `validate` would reject.
    pub fn cooldown(&self) -> Duration {
        Duration::try_from_secs_f64(self.cooldown_seconds).unwrap_or_default()
    }

    /// The configured ratio, or the default kept at least
    /// `WINK_OPEN_MARGIN` above `expression_threshold`, which doubles as the
    /// wink "closed" ratio.
    pub fn wink_open_ratio(&self) -> f64 {
        self.wink_open_ratio.unwrap_or_else(|| {
            DEFAULT_WINK_OPEN_RATIO.max(self.expression_threshold + WINK_OPEN_MARGIN)
        })
    }

    pub fn hold_sample_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.hold_sample_seconds).unwrap_or_default()
    }

    pub fn thresholds(&self) -> ClassifierThresholds {
        ClassifierThresholds {
            expression_threshold: self.expression_threshold,
            wink_open_ratio: self.wink_open_ratio(),
            baseline_alpha: self.baseline_alpha,
        }
    }
}
