//! Validation outcome records.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ensure_unit, EngineResult};

/// Quality metrics attached to a validation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationMetrics {
    /// Confidence of the validation in `[0, 1]`.
    pub confidence: f32,
    /// Impact of the validated action in `[0, 1]`.
    pub impact: f32,
    /// Resonance with the surrounding context in `[0, 1]`.
    pub resonance: f32,
}

impl ValidationMetrics {
    /// Create validated metrics.
    pub fn new(confidence: f32, impact: f32, resonance: f32) -> EngineResult<Self> {
        let metrics = Self {
            confidence,
            impact,
            resonance,
        };
        metrics.validate()?;
        Ok(metrics)
    }

    /// Reject non-finite or out-of-range values.
    pub fn validate(&self) -> EngineResult<()> {
        ensure_unit("metrics.confidence", self.confidence)?;
        ensure_unit("metrics.impact", self.impact)?;
        ensure_unit("metrics.resonance", self.resonance)?;
        Ok(())
    }
}

impl Default for ValidationMetrics {
    fn default() -> Self {
        Self {
            confidence: 0.5,
            impact: 0.5,
            resonance: 0.5,
        }
    }
}

/// One validation outcome.
///
/// Records are immutable once created; the ledger only inserts and evicts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRecord {
    id: Uuid,
    category: String,
    timestamp_ms: u64,
    success: bool,
    energy: f32,
    context: BTreeSet<String>,
    metrics: ValidationMetrics,
}

impl ValidationRecord {
    /// Create a record, validating energy and metrics.
    pub fn new(
        category: impl Into<String>,
        timestamp_ms: u64,
        success: bool,
        energy: f32,
        context: impl IntoIterator<Item = impl Into<String>>,
        metrics: ValidationMetrics,
    ) -> EngineResult<Self> {
        ensure_unit("energy", energy)?;
        metrics.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            category: category.into(),
            timestamp_ms,
            success,
            energy,
            context: context.into_iter().map(Into::into).collect(),
            metrics,
        })
    }

    /// Unique record id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Threshold category this outcome belongs to.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Logical timestamp in milliseconds.
    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    /// Whether the validated action succeeded.
    pub fn success(&self) -> bool {
        self.success
    }

    /// Energy level observed with the outcome.
    pub fn energy(&self) -> f32 {
        self.energy
    }

    /// Context tags.
    pub fn context(&self) -> &BTreeSet<String> {
        &self.context
    }

    /// Quality metrics.
    pub fn metrics(&self) -> &ValidationMetrics {
        &self.metrics
    }

    /// Whether this record shares at least one tag with `tags`.
    pub fn shares_context(&self, tags: &BTreeSet<String>) -> bool {
        !self.context.is_disjoint(tags)
    }
}
