//! Quality-gated state preservation.
//!
//! Snapshots are only taken while the flow is highly coherent and protection
//! is stable:
//!
//! ```text
//! coherence  = mean(core flow metrics)        >= coherence_threshold (0.98)
//! stability  = mean(protection metrics)       >= stability_threshold (0.95)
//! efficiency = flow quality * stability
//! ```
//!
//! Accepted snapshots go to the head of a bounded ring; the oldest is evicted
//! on overflow. Snapshots whose coherence exceeds the recovery bar are listed
//! as recovery points.

mod snapshot;

pub use snapshot::{PreservedState, SnapshotQuality};

use std::collections::VecDeque;

use crate::config::PreservationConfig;
use crate::error::EngineResult;
use crate::flow::{FlowState, ProtectionState};

/// Bounded ring of preserved states, newest first.
///
/// # Example
///
/// ```
/// use flowstate_engine::config::PreservationConfig;
/// use flowstate_engine::flow::{FlowMetrics, FlowState, ProtectionState};
/// use flowstate_engine::preservation::PreservationLedger;
///
/// let mut ledger = PreservationLedger::new(&PreservationConfig::default());
/// let coherent = FlowState::resting(FlowMetrics::uniform(1.0));
///
/// let kept = ledger
///     .preserve(&coherent, serde_json::json!({"room": "a"}), &ProtectionState::default(), 42)
///     .unwrap();
/// assert!(kept);
/// assert_eq!(ledger.restore(None).unwrap().timestamp_ms(), 42);
/// assert_eq!(ledger.recovery_points(), &[42]);
/// ```
#[derive(Debug, Clone)]
pub struct PreservationLedger {
    states: VecDeque<PreservedState>,
    recovery_points: Vec<i64>,
    coherence_threshold: f32,
    stability_threshold: f32,
    max_backups: usize,
    recovery_coherence: f32,
}

impl PreservationLedger {
    pub fn new(config: &PreservationConfig) -> Self {
        let max_backups = config.max_backups.max(1);
        Self {
            states: VecDeque::with_capacity(max_backups),
            recovery_points: Vec::new(),
            coherence_threshold: config.coherence_threshold,
            stability_threshold: config.stability_threshold,
            max_backups,
            recovery_coherence: config.recovery_coherence,
        }
    }

    /// Snapshot the given state if it passes the quality gate.
    ///
    /// Returns `Ok(false)` and leaves the ring untouched when the gate is not
    /// met.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidArgument`](crate::error::EngineError::InvalidArgument)
    /// when the flow or protection metrics are malformed.
    pub fn preserve(
        &mut self,
        flow: &FlowState,
        space: serde_json::Value,
        protection: &ProtectionState,
        timestamp_ms: i64,
    ) -> EngineResult<bool> {
        flow.metrics().validate()?;
        protection.metrics.validate()?;

        let quality = SnapshotQuality::measure(flow, protection);
        if quality.coherence < self.coherence_threshold || quality.stability < self.stability_threshold
        {
            tracing::debug!(
                coherence = quality.coherence,
                stability = quality.stability,
                "state below preservation gate"
            );
            return Ok(false);
        }

        self.states.push_front(PreservedState::new(
            timestamp_ms,
            flow.clone(),
            space,
            protection.clone(),
            quality,
        ));
        self.states.truncate(self.max_backups);
        self.recompute_recovery_points();

        tracing::info!(
            timestamp_ms,
            coherence = quality.coherence,
            efficiency = quality.efficiency,
            backups = self.states.len(),
            "state preserved"
        );
        Ok(true)
    }

    /// Newest snapshot, or the newest one with exactly `timestamp_ms`.
    pub fn restore(&self, timestamp_ms: Option<i64>) -> Option<&PreservedState> {
        match timestamp_ms {
            None => self.states.front(),
            Some(ts) => self.states.iter().find(|s| s.timestamp_ms() == ts),
        }
    }

    /// Timestamps of snapshots above the recovery bar, newest first.
    pub fn recovery_points(&self) -> &[i64] {
        &self.recovery_points
    }

    /// Snapshots, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &PreservedState> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_backups
    }

    fn recompute_recovery_points(&mut self) {
        let bar = self.recovery_coherence;
        self.recovery_points = self
            .states
            .iter()
            .filter(|s| s.coherence() > bar)
            .map(PreservedState::timestamp_ms)
            .collect();
    }
}

impl Default for PreservationLedger {
    fn default() -> Self {
        Self::new(&PreservationConfig::default())
    }
}
