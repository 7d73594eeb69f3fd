//! Periodic tick handlers.

use super::types::{FlowStateMachine, MetricsUpdate};

impl FlowStateMachine {
    /// Accumulate session duration.
    ///
    /// Skipped (returns `false`) while no session is active.
    pub fn on_duration_tick(&mut self, elapsed_ms: u64) -> bool {
        if !self.state.active {
            return false;
        }
        self.state.duration_ms = self.state.duration_ms.saturating_add(elapsed_ms);
        true
    }

    /// Step the metrics toward flow and reclassify.
    ///
    /// Skipped (returns `None`) while no session is active; skipped ticks are
    /// not replayed later.
    pub fn on_metrics_tick(&mut self, now_ms: u64) -> Option<MetricsUpdate> {
        if !self.state.active {
            return None;
        }

        self.state.step_metrics(self.metric_step);
        self.protection.last_check_ms = now_ms;
        let transition = self.reclassify(now_ms);

        let update = MetricsUpdate {
            average: self.state.metrics().average(),
            quality: self.state.quality(),
            transition,
        };
        tracing::debug!(
            average = update.average,
            quality = update.quality,
            flow_type = %self.state.flow_type,
            "flow metrics tick"
        );
        Some(update)
    }
}
