//! Logical time and timer dispatch.

use std::time::Duration;

use crate::events::FlowEvent;
use crate::scheduler::{EngineTask, Firing};

use super::types::FlowEngine;

impl FlowEngine {
    /// Advance logical time, running every timer that falls due.
    ///
    /// Firings run one at a time in chronological order (ties by timer id),
    /// each to completion before the next is taken, so a firing that ends a
    /// session stops the session's later ticks.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use flowstate_engine::FlowEngine;
    ///
    /// let mut engine = FlowEngine::default();
    /// assert!(engine.start_flow());
    /// engine.advance(Duration::from_secs(3));
    /// assert_eq!(engine.now_ms(), 3_000);
    /// assert_eq!(engine.flow_state().duration_ms, 3_000);
    /// ```
    pub fn advance(&mut self, duration: Duration) {
        let step = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        let until_ms = self.now_ms().saturating_add(step);

        while let Some(firing) = self.scheduler.pop_due(until_ms) {
            self.poll_recovery(firing.at_ms);
            self.dispatch(firing);
        }
        self.scheduler.settle(until_ms);
        self.poll_recovery(until_ms);
    }

    /// Whether the adaptation timer is running.
    pub fn is_adapting(&self) -> bool {
        self.scheduler.is_scheduled(self.adaptation_timer)
    }

    /// Stop periodic threshold adaptation; `false` if already stopped.
    pub fn stop_adaptation(&mut self) -> bool {
        self.scheduler.cancel(self.adaptation_timer)
    }

    fn dispatch(&mut self, firing: Firing<EngineTask>) {
        match firing.task {
            EngineTask::Adaptation => {
                let report = self.adapt_thresholds();
                tracing::debug!(
                    at_ms = firing.at_ms,
                    adapted = report.adapted.len(),
                    "adaptation cycle"
                );
            }
            EngineTask::FlowDuration => {
                let elapsed = self.config.flow.duration_interval_ms.max(1);
                self.machine.on_duration_tick(elapsed);
            }
            EngineTask::FlowMetrics => {
                let Some(update) = self.machine.on_metrics_tick(firing.at_ms) else {
                    return;
                };
                self.after_flow_change(update.transition);
                if let Err(err) = self.preserve_state() {
                    tracing::warn!(error = %err, "state preservation failed");
                }
            }
        }
    }

    fn poll_recovery(&mut self, now_ms: u64) {
        if let Some(transition) = self.machine.poll_recovery(now_ms) {
            self.events.broadcast(&FlowEvent::Transition(transition));
            self.publish_flow();
        }
    }
}
