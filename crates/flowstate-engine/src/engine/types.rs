//! Flow engine struct definition.

use crate::config::EngineConfig;
use crate::events::{FlowEventBroadcaster, StateSubject};
use crate::flow::{FlowState, FlowStateMachine};
use crate::history::HistoryLedger;
use crate::pattern::PatternRegistry;
use crate::preservation::PreservationLedger;
use crate::scheduler::{EngineTask, TickScheduler, TimerId};
use crate::threshold::{ThresholdAdapter, ThresholdStore};

/// Adaptive validation and flow-state engine.
///
/// Owns every component and the logical clock. Nothing is shared between
/// engines; create one per session owner.
///
/// ```text
/// observe --> HistoryLedger --(every 5 s)--> ThresholdAdapter --> ThresholdStore
/// Observation --> PatternRegistry --> ranked PatternMatch list
/// start_flow/end_flow + ticks --> FlowStateMachine --> PreservationLedger
/// ```
#[derive(Debug)]
pub struct FlowEngine {
    /// Validated configuration the engine was built from.
    pub(crate) config: EngineConfig,

    /// Logical clock and interval timers.
    pub(crate) scheduler: TickScheduler<EngineTask>,

    /// Adaptation interval timer, registered at construction.
    pub(crate) adaptation_timer: TimerId,

    pub(crate) thresholds: ThresholdStore,
    pub(crate) adapter: ThresholdAdapter,
    pub(crate) history: HistoryLedger,
    pub(crate) patterns: PatternRegistry,
    pub(crate) machine: FlowStateMachine,
    pub(crate) preservation: PreservationLedger,

    /// Opaque caller state stored with each snapshot.
    pub(crate) space: serde_json::Value,

    pub(crate) events: FlowEventBroadcaster,
    pub(crate) flow_subject: StateSubject<FlowState>,
}
