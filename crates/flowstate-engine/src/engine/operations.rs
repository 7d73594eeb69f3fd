//! Pattern, flow and preservation operations of the engine.

use crate::error::EngineResult;
use crate::events::FlowEvent;
use crate::flow::{FlowMetrics, FlowState, ProtectionMetrics, Transition};
use crate::pattern::{Observation, Pattern, PatternId, PatternMatch};
use crate::preservation::PreservedState;

use super::types::FlowEngine;

impl FlowEngine {
    // ---------------------------------------------------------------------
    // Patterns
    // ---------------------------------------------------------------------

    /// Register a pattern.
    pub fn register_pattern(&mut self, pattern: Pattern) -> EngineResult<PatternId> {
        self.patterns.add(pattern)
    }

    /// Remove a pattern; unknown ids yield `None`.
    pub fn remove_pattern(&mut self, id: PatternId) -> Option<Pattern> {
        self.patterns.remove(id)
    }

    /// Edit a pattern; see [`PatternRegistry::update`](crate::pattern::PatternRegistry::update).
    pub fn update_pattern<F>(&mut self, id: PatternId, f: F) -> bool
    where
        F: FnOnce(&mut Pattern),
    {
        self.patterns.update(id, f)
    }

    /// Count an activation of a pattern.
    pub fn activate_pattern(&mut self, id: PatternId) -> EngineResult<u64> {
        let activations = self.patterns.activate(id)?;
        self.events.broadcast(&FlowEvent::PatternActivated {
            pattern_id: id,
            activations,
        });
        Ok(activations)
    }

    /// Nudge a pattern's weight after an outcome.
    pub fn evolve_pattern(&mut self, id: PatternId, success: bool) -> EngineResult<f32> {
        self.patterns.evolve(id, success)
    }

    /// Ranked matches for an observation.
    pub fn find_matches(&self, observation: &Observation) -> EngineResult<Vec<PatternMatch>> {
        self.patterns.find_matches(observation)
    }

    // ---------------------------------------------------------------------
    // Flow
    // ---------------------------------------------------------------------

    /// Current flow state.
    pub fn flow_state(&self) -> &FlowState {
        self.machine.state()
    }

    /// Start a flow session; `false` when refused.
    pub fn start_flow(&mut self) -> bool {
        let now_ms = self.now_ms();
        match self.machine.try_start_flow(&mut self.scheduler, now_ms) {
            Ok(_) => {
                self.events.broadcast(&FlowEvent::FlowStarted { at_ms: now_ms });
                self.publish_flow();
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "flow start refused");
                false
            }
        }
    }

    /// End the running session; `false` when none is active.
    pub fn end_flow(&mut self) -> bool {
        let now_ms = self.now_ms();
        let Ok(transition) = self.machine.try_end_flow(&mut self.scheduler, now_ms) else {
            return false;
        };
        self.events.broadcast(&FlowEvent::FlowEnded {
            from: transition.from,
            duration_ms: self.machine.state().duration_ms,
            at_ms: now_ms,
        });
        self.publish_flow();
        true
    }

    /// Return the machine to RESTING defaults and cancel session timers.
    pub fn reset_flow(&mut self) {
        self.machine.reset(&mut self.scheduler);
        self.publish_flow();
    }

    /// Push observed flow metrics.
    pub fn update_flow_metrics(&mut self, metrics: FlowMetrics) -> EngineResult<()> {
        let transition = self.machine.update_metrics(metrics, self.now_ms())?;
        self.after_flow_change(transition);
        Ok(())
    }

    /// Blend an observed energy sample into the flow metrics.
    pub fn observe_energy(&mut self, energy: f32) -> EngineResult<()> {
        let transition = self.machine.observe_energy(energy, self.now_ms())?;
        self.after_flow_change(transition);
        Ok(())
    }

    /// Replace the protection health metrics.
    pub fn set_protection_metrics(&mut self, metrics: ProtectionMetrics) -> EngineResult<()> {
        self.machine.set_protection_metrics(metrics, self.now_ms())
    }

    pub(crate) fn after_flow_change(&mut self, transition: Option<Transition>) {
        if let Some(transition) = transition {
            self.events.broadcast(&FlowEvent::Transition(transition));
        }
        self.publish_flow();
    }

    pub(crate) fn publish_flow(&mut self) {
        self.flow_subject.publish(self.machine.state().clone());
    }

    // ---------------------------------------------------------------------
    // Preservation
    // ---------------------------------------------------------------------

    /// Store opaque caller state to be included in later snapshots.
    pub fn set_space_state(&mut self, space: serde_json::Value) {
        self.space = space;
    }

    pub fn space_state(&self) -> &serde_json::Value {
        &self.space
    }

    /// Snapshot the current flow, space and protection state if it passes the
    /// quality gate.
    pub fn preserve_state(&mut self) -> EngineResult<bool> {
        let timestamp_ms = i64::try_from(self.now_ms()).unwrap_or(i64::MAX);
        let kept = self.preservation.preserve(
            self.machine.state(),
            self.space.clone(),
            self.machine.protection(),
            timestamp_ms,
        )?;

        if kept {
            if let Some(state) = self.preservation.restore(None) {
                self.events.broadcast(&FlowEvent::StatePreserved {
                    timestamp_ms,
                    coherence: state.coherence(),
                });
            }
        }
        Ok(kept)
    }

    /// Newest snapshot, or the one taken at exactly `timestamp_ms`.
    pub fn restore_state(&self, timestamp_ms: Option<i64>) -> Option<&PreservedState> {
        self.preservation.restore(timestamp_ms)
    }

    /// Timestamps of snapshots above the recovery bar, newest first.
    pub fn recovery_points(&self) -> &[i64] {
        self.preservation.recovery_points()
    }
}
