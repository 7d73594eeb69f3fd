//! Flow session transitions.
//!
//! Session start/end, recovery polling and metric-driven classification.

use crate::error::{ensure_unit, EngineError, EngineResult};
use crate::scheduler::{EngineTask, TickScheduler};

use super::super::protection::ProtectionState;
use super::super::state::{FlowIntensity, FlowMetrics, FlowState, FlowType};
use super::types::{FlowStateMachine, SessionTimers, Transition};

impl FlowStateMachine {
    /// Start a flow session, reporting why it was refused.
    ///
    /// A session can start from RESTING or EXHAUSTED, or from RECOVERING once
    /// the cooldown policy reports completion. Every protection metric must be
    /// at or above the `medium` band. On success the machine enters FOCUS,
    /// raises the shield and registers its duration and metrics timers.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidTransition`] when a session is already running,
    /// the cooldown is incomplete, or protection health is too low. Nothing
    /// changes in that case and no timers are registered.
    ///
    /// # Example
    ///
    /// ```
    /// use flowstate_engine::flow::{FlowStateMachine, FlowType};
    /// use flowstate_engine::scheduler::TickScheduler;
    ///
    /// let mut scheduler = TickScheduler::new();
    /// let mut machine = FlowStateMachine::default();
    ///
    /// let transition = machine.try_start_flow(&mut scheduler, 0).unwrap();
    /// assert_eq!(transition.from, FlowType::Resting);
    /// assert_eq!(transition.to, FlowType::Focus);
    /// assert_eq!(scheduler.active_timers(), 2);
    ///
    /// assert!(machine.try_start_flow(&mut scheduler, 10).is_err());
    /// ```
    pub fn try_start_flow(
        &mut self,
        scheduler: &mut TickScheduler<EngineTask>,
        now_ms: u64,
    ) -> EngineResult<Transition> {
        let target = FlowType::Focus;

        if self.state.active {
            return Err(EngineError::invalid_transition(
                self.state.flow_type.as_str(),
                target.as_str(),
                "a flow session is already active",
            ));
        }

        self.poll_recovery(now_ms);
        if self.state.flow_type == FlowType::Recovering {
            return Err(EngineError::invalid_transition(
                FlowType::Recovering.as_str(),
                target.as_str(),
                "recovery cooldown has not completed",
            ));
        }

        if !self.protection_healthy() {
            return Err(EngineError::invalid_transition(
                self.state.flow_type.as_str(),
                target.as_str(),
                format!(
                    "protection metric {:.3} is below the entry bar {:.3}",
                    self.protection.metrics.weakest(),
                    self.bands.medium
                ),
            ));
        }

        let from = self.state.flow_type;
        self.state.active = true;
        self.state.flow_type = target;
        self.state.intensity = FlowIntensity::from_average(self.state.metrics().average(), &self.bands);
        self.state.duration_ms = 0;
        self.state.last_transition_ms = now_ms;
        self.state.protected = true;

        self.protection.active = true;
        self.protection.flow_shield_active = true;
        self.protection.last_check_ms = now_ms;

        // Leftover timers would double-tick the session.
        self.cancel_timers(scheduler);
        self.timers = Some(SessionTimers {
            duration: scheduler.schedule_interval(EngineTask::FlowDuration, self.duration_interval_ms),
            metrics: scheduler.schedule_interval(EngineTask::FlowMetrics, self.metrics_interval_ms),
        });

        tracing::info!(from = %from, at_ms = now_ms, "flow session started");
        Ok(Transition {
            from,
            to: target,
            at_ms: now_ms,
        })
    }

    /// Start a flow session.
    ///
    /// Returns `false` when the start is refused; see
    /// [`FlowStateMachine::try_start_flow`] for the reasons.
    pub fn start_flow(&mut self, scheduler: &mut TickScheduler<EngineTask>, now_ms: u64) -> bool {
        match self.try_start_flow(scheduler, now_ms) {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(error = %err, "flow start refused");
                false
            }
        }
    }

    /// End the running session and enter RECOVERING.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidTransition`] when no session is active.
    pub fn try_end_flow(
        &mut self,
        scheduler: &mut TickScheduler<EngineTask>,
        now_ms: u64,
    ) -> EngineResult<Transition> {
        if !self.state.active {
            return Err(EngineError::invalid_transition(
                self.state.flow_type.as_str(),
                FlowType::Recovering.as_str(),
                "no flow session is active",
            ));
        }

        self.cancel_timers(scheduler);

        let from = self.state.flow_type;
        self.state.active = false;
        self.state.flow_type = FlowType::Recovering;
        self.state.last_transition_ms = now_ms;
        self.state.protected = false;

        self.protection.active = false;
        self.protection.flow_shield_active = false;

        tracing::info!(
            from = %from,
            duration_ms = self.state.duration_ms,
            quality = self.state.quality(),
            "flow session ended"
        );
        Ok(Transition {
            from,
            to: FlowType::Recovering,
            at_ms: now_ms,
        })
    }

    /// End the running session.
    ///
    /// Returns `false` and changes nothing when no session is active, so
    /// calling it twice is harmless.
    pub fn end_flow(&mut self, scheduler: &mut TickScheduler<EngineTask>, now_ms: u64) -> bool {
        self.try_end_flow(scheduler, now_ms).is_ok()
    }

    /// Return to RESTING defaults, cancelling any session timers.
    pub fn reset(&mut self, scheduler: &mut TickScheduler<EngineTask>) {
        self.cancel_timers(scheduler);
        self.state = FlowState::default();
        self.protection = ProtectionState::default();
    }

    /// Finish recovery if the cooldown policy allows it.
    ///
    /// The metrics observed so far are kept; duration and intensity start
    /// over.
    pub fn poll_recovery(&mut self, now_ms: u64) -> Option<Transition> {
        if self.state.flow_type != FlowType::Recovering
            || !self.cooldown.is_complete(&self.state, now_ms)
        {
            return None;
        }

        self.state.flow_type = FlowType::Resting;
        self.state.intensity = FlowIntensity::Low;
        self.state.duration_ms = 0;
        self.state.last_transition_ms = now_ms;
        tracing::debug!(at_ms = now_ms, "recovery complete");

        Some(Transition {
            from: FlowType::Recovering,
            to: FlowType::Resting,
            at_ms: now_ms,
        })
    }

    /// Replace the session metrics with observed values.
    ///
    /// Metrics are validated first; an invalid set changes nothing. While a
    /// session is active the state is reclassified immediately.
    pub fn update_metrics(
        &mut self,
        metrics: FlowMetrics,
        now_ms: u64,
    ) -> EngineResult<Option<Transition>> {
        self.state.set_metrics(metrics)?;
        Ok(self.reclassify(now_ms))
    }

    /// Blend an observed energy sample into the energy metric.
    ///
    /// ```text
    /// energy' = energy * (1 - blend) + sample * blend
    /// ```
    pub fn observe_energy(&mut self, energy: f32, now_ms: u64) -> EngineResult<Option<Transition>> {
        let sample = ensure_unit("energy", energy)?;
        let mut metrics = *self.state.metrics();
        metrics.energy =
            (metrics.energy * (1.0 - self.energy_blend) + sample * self.energy_blend).clamp(0.0, 1.0);
        self.state.set_metrics(metrics)?;
        Ok(self.reclassify(now_ms))
    }

    /// Refresh intensity and, while active, the classification.
    pub(crate) fn reclassify(&mut self, now_ms: u64) -> Option<Transition> {
        let average = self.state.metrics().average();
        self.state.intensity = FlowIntensity::from_average(average, &self.bands);

        if !self.state.active {
            return None;
        }

        let target = self.classify(average)?;
        if target == self.state.flow_type {
            return None;
        }

        let from = self.state.flow_type;
        self.state.flow_type = target;
        self.state.last_transition_ms = now_ms;
        tracing::debug!(from = %from, to = %target, average, "flow state reclassified");

        Some(Transition {
            from,
            to: target,
            at_ms: now_ms,
        })
    }

    /// Target state for an averaged metric value, `None` when the value sits
    /// between the low and medium bands.
    pub fn classify(&self, average: f32) -> Option<FlowType> {
        let bands = &self.bands;
        if average > bands.peak {
            Some(FlowType::Hyperfocus)
        } else if average > bands.high {
            Some(FlowType::Flow)
        } else if average > bands.medium {
            Some(FlowType::Focus)
        } else if average < bands.low {
            Some(FlowType::Exhausted)
        } else {
            None
        }
    }

    fn cancel_timers(&mut self, scheduler: &mut TickScheduler<EngineTask>) {
        if let Some(timers) = self.timers.take() {
            scheduler.cancel(timers.duration);
            scheduler.cancel(timers.metrics);
        }
    }
}
