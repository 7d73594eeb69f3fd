//! Type definitions for the flow-state machine.

use serde::{Deserialize, Serialize};

use super::super::protection::ProtectionState;
use super::super::state::{FlowState, FlowType};
use super::cooldown::CooldownPolicy;
use crate::config::FlowBands;
use crate::scheduler::TimerId;

/// A state change performed by the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// State before the change.
    pub from: FlowType,
    /// State after the change.
    pub to: FlowType,
    /// Logical time of the change.
    pub at_ms: u64,
}

/// Result of an applied metrics tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsUpdate {
    /// Averaged core metrics after the tick.
    pub average: f32,
    /// Quality after the tick.
    pub quality: f32,
    /// State change caused by the tick, if any.
    pub transition: Option<Transition>,
}

/// Timers owned by a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SessionTimers {
    pub(crate) duration: TimerId,
    pub(crate) metrics: TimerId,
}

/// Flow-state machine.
///
/// ```text
/// RESTING --start_flow--> FOCUS -> FLOW -> HYPERFOCUS
///                           \______\_______\__> EXHAUSTED
/// (any active) --end_flow--> RECOVERING --cooldown--> RESTING
/// ```
///
/// Metric-driven transitions happen on metrics ticks (and on caller metric
/// updates) while a session is active. Starting a session is gated on the
/// protection health being at or above the `medium` band.
#[derive(Debug)]
pub struct FlowStateMachine {
    /// Live flow state.
    pub(crate) state: FlowState,

    /// Protection subsystem state.
    pub(crate) protection: ProtectionState,

    /// Classification bands.
    pub(crate) bands: FlowBands,

    /// Per-tick metric step.
    pub(crate) metric_step: f32,

    /// Duration tick period.
    pub(crate) duration_interval_ms: u64,

    /// Metrics tick period.
    pub(crate) metrics_interval_ms: u64,

    /// Blend factor for observed energy samples.
    pub(crate) energy_blend: f32,

    /// Timers of the running session, `None` when inactive.
    pub(crate) timers: Option<SessionTimers>,

    /// Recovery completion policy.
    pub(crate) cooldown: Box<dyn CooldownPolicy>,
}
