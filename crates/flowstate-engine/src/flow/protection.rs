//! Flow protection health.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_unit, EngineResult};

/// Health metrics of the protection subsystem, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProtectionMetrics {
    pub stability: f32,
    pub resilience: f32,
    pub integrity: f32,
    pub immunity: f32,
}

impl ProtectionMetrics {
    /// All metrics at `level`.
    pub fn uniform(level: f32) -> Self {
        Self {
            stability: level,
            resilience: level,
            integrity: level,
            immunity: level,
        }
    }

    /// Reject non-finite or out-of-range values.
    pub fn validate(&self) -> EngineResult<()> {
        ensure_unit("protection.stability", self.stability)?;
        ensure_unit("protection.resilience", self.resilience)?;
        ensure_unit("protection.integrity", self.integrity)?;
        ensure_unit("protection.immunity", self.immunity)?;
        Ok(())
    }

    fn values(&self) -> [f32; 4] {
        [self.stability, self.resilience, self.integrity, self.immunity]
    }

    /// Mean of the four metrics.
    pub fn mean(&self) -> f32 {
        self.values().iter().sum::<f32>() / 4.0
    }

    /// Lowest metric.
    pub fn weakest(&self) -> f32 {
        self.values().into_iter().fold(f32::INFINITY, f32::min)
    }

    /// Whether every metric is at or above `bar`.
    pub fn all_at_least(&self, bar: f32) -> bool {
        self.values().iter().all(|&v| v >= bar)
    }
}

impl Default for ProtectionMetrics {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

/// Protection state carried alongside the flow state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProtectionState {
    /// Whether protection is engaged (a flow session is running).
    pub active: bool,
    /// Health metrics.
    pub metrics: ProtectionMetrics,
    /// Logical time of the last health check.
    pub last_check_ms: u64,
    /// Health drops below the entry bar observed during active sessions.
    pub violations: u32,
    /// Whether the flow shield is raised.
    pub flow_shield_active: bool,
}
