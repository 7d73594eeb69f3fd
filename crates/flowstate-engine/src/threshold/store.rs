//! Per-category adaptive thresholds.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::stats::{jaccard, success_rate};
use crate::config::{ThresholdSeed, ThresholdsConfig};
use crate::error::{ensure_unit, EngineError, EngineResult};
use crate::history::HistoryLedger;

/// Adaptive threshold of one validation category.
///
/// Effective value:
///
/// ```text
/// base + energy * energy_factor
///      + context_resonance * context_factor
///      + success_rate * history_factor      clamped to [min_value, max_value]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    /// Category name.
    pub category: String,
    /// Base value.
    pub base: f32,
    /// Weight of caller energy.
    pub energy_factor: f32,
    /// Weight of context resonance.
    pub context_factor: f32,
    /// Weight of historical success rate.
    pub history_factor: f32,
    /// Lower clamp.
    pub min_value: f32,
    /// Upper clamp.
    pub max_value: f32,
}

impl Threshold {
    /// Combine the inputs with this threshold's factors and clamp.
    ///
    /// Inverted bounds resolve to `max_value` instead of panicking;
    /// [`ThresholdStore::calculate`] rejects them before getting here.
    pub fn effective(&self, energy: f32, context_resonance: f32, success_rate: f32) -> f32 {
        let raw = self.base
            + energy * self.energy_factor
            + context_resonance * self.context_factor
            + success_rate * self.history_factor;
        if raw.is_nan() {
            return self.min_value;
        }
        raw.max(self.min_value).min(self.max_value)
    }

    /// Check factors and bounds are in `[0, 1]` with `min_value <= max_value`.
    pub fn validate(&self) -> EngineResult<()> {
        let unit_fields = [
            ("base", self.base),
            ("energy_factor", self.energy_factor),
            ("context_factor", self.context_factor),
            ("history_factor", self.history_factor),
            ("min_value", self.min_value),
            ("max_value", self.max_value),
        ];
        for (name, value) in unit_fields {
            ensure_unit(name, value)?;
        }
        if self.min_value > self.max_value {
            return Err(EngineError::invalid_argument(
                "min_value",
                self.min_value,
                format!("must not exceed max_value ({})", self.max_value),
            ));
        }
        Ok(())
    }
}

impl From<&ThresholdSeed> for Threshold {
    fn from(seed: &ThresholdSeed) -> Self {
        Self {
            category: seed.category.clone(),
            base: seed.base,
            energy_factor: seed.energy_factor,
            context_factor: seed.context_factor,
            history_factor: seed.history_factor,
            min_value: seed.min_value,
            max_value: seed.max_value,
        }
    }
}

/// Store of all category thresholds.
///
/// Categories are fixed at construction and never removed. The adapter
/// replaces the whole map in one step after an adaptation cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdStore {
    thresholds: BTreeMap<String, Threshold>,
}

impl ThresholdStore {
    /// Seed a store from configuration.
    pub fn from_config(config: &ThresholdsConfig) -> Self {
        let thresholds = config
            .categories
            .iter()
            .map(|seed| (seed.category.clone(), Threshold::from(seed)))
            .collect();
        Self { thresholds }
    }

    /// Look up a category.
    pub fn get(&self, category: &str) -> EngineResult<&Threshold> {
        self.thresholds
            .get(category)
            .ok_or_else(|| EngineError::CategoryNotFound(category.to_string()))
    }

    /// Whether the category exists.
    pub fn contains(&self, category: &str) -> bool {
        self.thresholds.contains_key(category)
    }

    /// Category names in sorted order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.thresholds.keys().map(String::as_str)
    }

    /// All thresholds in category order.
    pub fn iter(&self) -> impl Iterator<Item = &Threshold> {
        self.thresholds.values()
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    /// Whether the store has no categories.
    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    /// Compute the effective threshold for a category.
    ///
    /// Context resonance and success rate are taken over the ledger records of
    /// `category` that share at least one tag with `context`; both are `0.0`
    /// when there are no such records.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidArgument`] if `energy` is outside `[0, 1]`
    /// - [`EngineError::CategoryNotFound`] for unknown categories
    /// - [`EngineError::InvalidArgument`] if the stored threshold is malformed
    pub fn calculate(
        &self,
        category: &str,
        energy: f32,
        context: &BTreeSet<String>,
        history: &HistoryLedger,
    ) -> EngineResult<f32> {
        ensure_unit("energy", energy)?;
        let threshold = self.get(category)?;
        threshold.validate()?;

        let related: Vec<_> = history.related(category, context).collect();
        let (resonance, rate) = if related.is_empty() {
            (0.0, 0.0)
        } else {
            let resonance = related
                .iter()
                .map(|r| jaccard(context, r.context()))
                .sum::<f32>()
                / related.len() as f32;
            let rate = success_rate(related.iter().map(|r| r.success()));
            (resonance, rate)
        };

        Ok(threshold.effective(energy, resonance, rate))
    }

    /// Replace every threshold at once.
    ///
    /// Only categories already present are updated; unknown categories in
    /// `updated` are ignored so the category set never changes. Entries that
    /// fail [`Threshold::validate`] keep their previous value.
    pub(crate) fn replace_all(&mut self, updated: BTreeMap<String, Threshold>) {
        for (category, threshold) in updated {
            let Some(slot) = self.thresholds.get_mut(&category) else {
                continue;
            };
            match threshold.validate() {
                Ok(()) => *slot = threshold,
                Err(err) => {
                    tracing::warn!(category = %category, error = %err, "threshold update rejected");
                }
            }
        }
    }

    /// Clone the current map (input for an adaptation cycle).
    pub fn snapshot(&self) -> BTreeMap<String, Threshold> {
        self.thresholds.clone()
    }
}

impl Default for ThresholdStore {
    fn default() -> Self {
        Self::from_config(&ThresholdsConfig::default())
    }
}
