//! Constructors and accessors of the flow-state machine.

use super::super::protection::{ProtectionMetrics, ProtectionState};
use super::super::state::{FlowMetrics, FlowState, FlowType};
use super::cooldown::{CooldownPolicy, ElapsedCooldown};
use super::types::FlowStateMachine;
use crate::config::{FlowBands, FlowConfig};
use crate::error::EngineResult;

impl FlowStateMachine {
    /// Create a resting machine from configuration.
    ///
    /// Recovery uses an [`ElapsedCooldown`] of `config.cooldown_ms`.
    ///
    /// # Example
    ///
    /// ```
    /// use flowstate_engine::config::FlowConfig;
    /// use flowstate_engine::flow::{FlowStateMachine, FlowType};
    ///
    /// let machine = FlowStateMachine::new(&FlowConfig::default());
    /// assert_eq!(machine.flow_type(), FlowType::Resting);
    /// assert!(!machine.is_active());
    /// ```
    pub fn new(config: &FlowConfig) -> Self {
        Self {
            state: FlowState::default(),
            protection: ProtectionState::default(),
            bands: config.bands,
            metric_step: config.metric_step,
            duration_interval_ms: config.duration_interval_ms,
            metrics_interval_ms: config.metrics_interval_ms,
            energy_blend: config.energy_blend,
            timers: None,
            cooldown: Box::new(ElapsedCooldown::new(config.cooldown_ms)),
        }
    }

    /// Replace the recovery policy.
    pub fn with_cooldown(mut self, policy: impl CooldownPolicy + 'static) -> Self {
        self.cooldown = Box::new(policy);
        self
    }

    /// Replace the recovery policy in place.
    pub fn set_cooldown(&mut self, policy: impl CooldownPolicy + 'static) {
        self.cooldown = Box::new(policy);
    }

    /// Current flow state.
    #[inline]
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Current classification.
    #[inline]
    pub fn flow_type(&self) -> FlowType {
        self.state.flow_type
    }

    /// Whether a session is running.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.state.active
    }

    /// Protection state.
    #[inline]
    pub fn protection(&self) -> &ProtectionState {
        &self.protection
    }

    /// Classification bands.
    #[inline]
    pub fn bands(&self) -> &FlowBands {
        &self.bands
    }

    /// Whether session timers are registered.
    #[inline]
    pub fn has_timers(&self) -> bool {
        self.timers.is_some()
    }

    /// Current metrics.
    #[inline]
    pub fn metrics(&self) -> &FlowMetrics {
        self.state.metrics()
    }

    /// Whether the protection health admits a new session.
    pub fn protection_healthy(&self) -> bool {
        self.protection.metrics.all_at_least(self.bands.medium)
    }

    /// Replace the protection health metrics.
    ///
    /// A drop below the `medium` band during an active session counts as a
    /// violation.
    pub fn set_protection_metrics(
        &mut self,
        metrics: ProtectionMetrics,
        now_ms: u64,
    ) -> EngineResult<()> {
        metrics.validate()?;
        self.protection.metrics = metrics;
        self.protection.last_check_ms = now_ms;
        if self.state.active && !self.protection_healthy() {
            self.protection.violations = self.protection.violations.saturating_add(1);
            tracing::warn!(
                weakest = metrics.weakest(),
                violations = self.protection.violations,
                "protection health dropped below entry bar during flow"
            );
        }
        Ok(())
    }
}

impl Default for FlowStateMachine {
    fn default() -> Self {
        Self::new(&FlowConfig::default())
    }
}
