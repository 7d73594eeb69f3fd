//! Preserved state snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::flow::{FlowState, ProtectionState};

/// Quality figures derived from a flow/protection pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapshotQuality {
    /// Mean of the seven core flow metrics.
    pub coherence: f32,
    /// Mean of the protection metrics.
    pub stability: f32,
    /// Flow quality scaled by stability.
    pub efficiency: f32,
}

impl SnapshotQuality {
    pub fn measure(flow: &FlowState, protection: &ProtectionState) -> Self {
        let coherence = flow.metrics().average();
        let stability = protection.metrics.mean();
        Self {
            coherence,
            stability,
            efficiency: flow.quality() * stability,
        }
    }
}

/// An immutable snapshot of engine state.
///
/// `space` is opaque caller state stored alongside the flow state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreservedState {
    timestamp_ms: i64,
    created_at: DateTime<Utc>,
    flow: FlowState,
    space: serde_json::Value,
    protection: ProtectionState,
    quality: SnapshotQuality,
}

impl PreservedState {
    pub(crate) fn new(
        timestamp_ms: i64,
        flow: FlowState,
        space: serde_json::Value,
        protection: ProtectionState,
        quality: SnapshotQuality,
    ) -> Self {
        Self {
            timestamp_ms,
            created_at: Utc::now(),
            flow,
            space,
            protection,
            quality,
        }
    }

    /// Logical timestamp used for point-in-time restore.
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    /// Wall-clock creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn flow(&self) -> &FlowState {
        &self.flow
    }

    pub fn space(&self) -> &serde_json::Value {
        &self.space
    }

    pub fn protection(&self) -> &ProtectionState {
        &self.protection
    }

    pub fn coherence(&self) -> f32 {
        self.quality.coherence
    }

    pub fn stability(&self) -> f32 {
        self.quality.stability
    }

    pub fn efficiency(&self) -> f32 {
        self.quality.efficiency
    }
}
