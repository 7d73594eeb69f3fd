//! History window and threshold adaptation settings.

use serde::{Deserialize, Serialize};

/// Default number of validation records retained by the ledger.
pub const HISTORY_WINDOW: usize = 100;

/// History ledger settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of records kept (most recent by timestamp).
    pub window: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            window: HISTORY_WINDOW,
        }
    }
}

impl HistoryConfig {
    /// Validate the history configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.window == 0 {
            return Err("history.window must be > 0".to_string());
        }
        Ok(())
    }
}

/// Threshold adaptation cycle settings.
///
/// Every `interval_ms` of logical time the adapter recomputes per-category
/// correlates from history and moves each correction factor by
/// `learning_rate` toward 1 (correlate above `correlation_bar`) or toward 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptationConfig {
    /// Logical milliseconds between adaptation cycles.
    pub interval_ms: u64,

    /// Step applied to a correction factor per cycle.
    pub learning_rate: f32,

    /// Correlate value above which a factor is nudged upward.
    pub correlation_bar: f32,
}

impl Default for AdaptationConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5_000,
            learning_rate: 0.1,
            correlation_bar: 0.7,
        }
    }
}

impl AdaptationConfig {
    /// Validate the adaptation configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.interval_ms == 0 {
            return Err("adaptation.interval_ms must be > 0".to_string());
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(format!(
                "adaptation.learning_rate must be in (0, 1], got {}",
                self.learning_rate
            ));
        }
        if !(0.0..=1.0).contains(&self.correlation_bar) {
            return Err(format!(
                "adaptation.correlation_bar must be in [0, 1], got {}",
                self.correlation_bar
            ));
        }
        Ok(())
    }
}

/// Pattern weight evolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Step applied to a pattern weight by `evolve_pattern`.
    pub weight_learning_rate: f32,

    /// Upper bound a pattern weight may evolve toward.
    pub max_weight: f32,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            weight_learning_rate: 0.1,
            max_weight: 1.5,
        }
    }
}

impl PatternConfig {
    /// Validate the pattern configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.weight_learning_rate > 0.0 && self.weight_learning_rate <= 1.0) {
            return Err(format!(
                "patterns.weight_learning_rate must be in (0, 1], got {}",
                self.weight_learning_rate
            ));
        }
        if !(self.max_weight.is_finite() && self.max_weight > 0.0) {
            return Err(format!(
                "patterns.max_weight must be finite and > 0, got {}",
                self.max_weight
            ));
        }
        Ok(())
    }
}
