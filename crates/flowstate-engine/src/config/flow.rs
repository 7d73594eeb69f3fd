//! Flow-state machine settings.

use serde::{Deserialize, Serialize};

/// Ascending classification bands for the averaged flow metrics.
///
/// ```text
/// avg > peak   -> HYPERFOCUS
/// avg > high   -> FLOW
/// avg > medium -> FOCUS
/// avg < low    -> EXHAUSTED
/// otherwise    -> unchanged
/// ```
///
/// `medium` doubles as the minimum protection health required to start a
/// flow session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowBands {
    /// Below this the session is exhausted.
    pub low: f32,
    /// Entry band for FOCUS and the protection health gate.
    pub medium: f32,
    /// Entry band for FLOW.
    pub high: f32,
    /// Entry band for HYPERFOCUS.
    pub peak: f32,
}

impl Default for FlowBands {
    fn default() -> Self {
        Self {
            low: 0.30,
            medium: 0.70,
            high: 0.85,
            peak: 0.95,
        }
    }
}

impl FlowBands {
    /// Validate that the bands lie in `[0, 1]` and strictly ascend.
    pub fn validate(&self) -> Result<(), String> {
        let bands = [self.low, self.medium, self.high, self.peak];
        if bands.iter().any(|b| !(0.0..=1.0).contains(b)) {
            return Err(format!("flow.bands must be in [0, 1], got {:?}", bands));
        }
        if !(self.low < self.medium && self.medium < self.high && self.high < self.peak) {
            return Err(format!(
                "flow.bands must ascend (low < medium < high < peak), got {:?}",
                bands
            ));
        }
        Ok(())
    }
}

/// Flow-state machine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Classification bands.
    pub bands: FlowBands,

    /// Per-tick increment of the "good" metrics (and decrement of resistance).
    pub metric_step: f32,

    /// Logical milliseconds between duration accumulation ticks.
    pub duration_interval_ms: u64,

    /// Logical milliseconds between metrics update ticks.
    pub metrics_interval_ms: u64,

    /// Blend factor applied to observed energy samples.
    pub energy_blend: f32,

    /// Cooldown used by the default elapsed-time recovery policy.
    pub cooldown_ms: u64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            bands: FlowBands::default(),
            metric_step: 0.05,
            duration_interval_ms: 1_000,
            metrics_interval_ms: 300_000,
            energy_blend: 0.3,
            cooldown_ms: 60_000,
        }
    }
}

impl FlowConfig {
    /// Validate the flow configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.bands.validate()?;
        if !(self.metric_step > 0.0 && self.metric_step <= 1.0) {
            return Err(format!(
                "flow.metric_step must be in (0, 1], got {}",
                self.metric_step
            ));
        }
        if self.duration_interval_ms == 0 {
            return Err("flow.duration_interval_ms must be > 0".to_string());
        }
        if self.metrics_interval_ms == 0 {
            return Err("flow.metrics_interval_ms must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.energy_blend) {
            return Err(format!(
                "flow.energy_blend must be in [0, 1], got {}",
                self.energy_blend
            ));
        }
        Ok(())
    }
}

/// State preservation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreservationConfig {
    /// Minimum flow coherence for a snapshot.
    pub coherence_threshold: f32,

    /// Minimum protection stability for a snapshot.
    pub stability_threshold: f32,

    /// Ring capacity.
    pub max_backups: usize,

    /// Coherence a snapshot must exceed to be listed as a recovery point.
    pub recovery_coherence: f32,
}

impl Default for PreservationConfig {
    fn default() -> Self {
        Self {
            coherence_threshold: 0.98,
            stability_threshold: 0.95,
            max_backups: 12,
            recovery_coherence: 0.99,
        }
    }
}

impl PreservationConfig {
    /// Validate the preservation configuration.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("coherence_threshold", self.coherence_threshold),
            ("stability_threshold", self.stability_threshold),
            ("recovery_coherence", self.recovery_coherence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!(
                    "preservation.{} must be in [0, 1], got {}",
                    name, value
                ));
            }
        }
        if self.max_backups == 0 {
            return Err("preservation.max_backups must be > 0".to_string());
        }
        Ok(())
    }
}
