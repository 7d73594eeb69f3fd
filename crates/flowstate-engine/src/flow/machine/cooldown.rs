//! Recovery cooldown policies.

use std::fmt;

use super::super::state::{FlowState, FlowType};

/// Decides when a RECOVERING session may return to RESTING.
///
/// Any `Fn(&FlowState, u64) -> bool` closure is a policy; the second
/// argument is the current logical time in milliseconds.
pub trait CooldownPolicy: Send + Sync {
    /// Whether recovery has finished.
    fn is_complete(&self, state: &FlowState, now_ms: u64) -> bool;
}

impl<F> CooldownPolicy for F
where
    F: Fn(&FlowState, u64) -> bool + Send + Sync,
{
    fn is_complete(&self, state: &FlowState, now_ms: u64) -> bool {
        self(state, now_ms)
    }
}

/// Recovery completes a fixed time after entering RECOVERING.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElapsedCooldown {
    /// Required cooldown in logical milliseconds.
    pub cooldown_ms: u64,
}

impl ElapsedCooldown {
    pub fn new(cooldown_ms: u64) -> Self {
        Self { cooldown_ms }
    }
}

impl CooldownPolicy for ElapsedCooldown {
    fn is_complete(&self, state: &FlowState, now_ms: u64) -> bool {
        state.flow_type == FlowType::Recovering
            && now_ms.saturating_sub(state.last_transition_ms) >= self.cooldown_ms
    }
}

impl fmt::Debug for dyn CooldownPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CooldownPolicy")
    }
}
