//! Periodic threshold adaptation.
//!
//! Each cycle reads the history ledger and moves every correction factor one
//! learning-rate step toward 1 when its correlate clears the bar, or toward 0
//! otherwise:
//!
//! | factor           | correlate                                   |
//! |------------------|---------------------------------------------|
//! | `energy_factor`  | Pearson(energy, success as 0/1)             |
//! | `context_factor` | mean pairwise Jaccard of context tag sets   |
//! | `history_factor` | success rate                                |
//!
//! Categories without history are left untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::stats::{mean_pairwise_jaccard, pearson_correlation, success_rate};
use super::store::ThresholdStore;
use crate::config::AdaptationConfig;
use crate::history::HistoryLedger;

/// Correlates observed for one category during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryCorrelates {
    /// Records considered.
    pub samples: usize,
    /// Fraction of successful outcomes.
    pub success_rate: f32,
    /// Pearson correlation between energy and success.
    pub energy_correlation: f32,
    /// Mean pairwise Jaccard similarity of context tags.
    pub context_resonance: f32,
}

/// Outcome of one adaptation cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdaptationReport {
    /// Correlates per adapted category.
    pub adapted: BTreeMap<String, CategoryCorrelates>,
}

impl AdaptationReport {
    /// Whether any category changed.
    pub fn is_empty(&self) -> bool {
        self.adapted.is_empty()
    }
}

/// Threshold adapter.
#[derive(Debug, Clone)]
pub struct ThresholdAdapter {
    learning_rate: f32,
    correlation_bar: f32,
}

impl ThresholdAdapter {
    /// Create an adapter from configuration.
    pub fn new(config: &AdaptationConfig) -> Self {
        Self {
            learning_rate: config.learning_rate,
            correlation_bar: config.correlation_bar,
        }
    }

    /// Compute correlates of one category, or `None` without history.
    pub fn correlates(&self, category: &str, history: &HistoryLedger) -> Option<CategoryCorrelates> {
        let records: Vec<_> = history.for_category(category).collect();
        if records.is_empty() {
            return None;
        }

        let energies: Vec<f32> = records.iter().map(|r| r.energy()).collect();
        let outcomes: Vec<f32> = records
            .iter()
            .map(|r| if r.success() { 1.0 } else { 0.0 })
            .collect();
        let tag_sets: Vec<_> = records.iter().map(|r| r.context()).collect();

        Some(CategoryCorrelates {
            samples: records.len(),
            success_rate: success_rate(records.iter().map(|r| r.success())),
            energy_correlation: pearson_correlation(&energies, &outcomes),
            context_resonance: mean_pairwise_jaccard(&tag_sets),
        })
    }

    /// Move `factor` one step toward 1 or 0 depending on `correlate`.
    pub fn nudge(&self, factor: f32, correlate: f32) -> f32 {
        let step = if correlate > self.correlation_bar {
            self.learning_rate
        } else {
            -self.learning_rate
        };
        (factor + step).clamp(0.0, 1.0)
    }

    /// Run one adaptation cycle against `store`.
    ///
    /// New thresholds are computed from a snapshot and written back in a
    /// single replacement.
    pub fn adapt(&self, store: &mut ThresholdStore, history: &HistoryLedger) -> AdaptationReport {
        let mut updated = store.snapshot();
        let mut report = AdaptationReport::default();

        for (category, threshold) in updated.iter_mut() {
            let Some(c) = self.correlates(category, history) else {
                continue;
            };

            threshold.energy_factor = self.nudge(threshold.energy_factor, c.energy_correlation);
            threshold.context_factor = self.nudge(threshold.context_factor, c.context_resonance);
            threshold.history_factor = self.nudge(threshold.history_factor, c.success_rate);

            debug!(
                category = %category,
                samples = c.samples,
                success_rate = c.success_rate,
                energy_correlation = c.energy_correlation,
                context_resonance = c.context_resonance,
                energy_factor = threshold.energy_factor,
                context_factor = threshold.context_factor,
                history_factor = threshold.history_factor,
                "threshold adapted"
            );
            report.adapted.insert(category.clone(), c);
        }

        store.replace_all(updated);
        report
    }
}

impl Default for ThresholdAdapter {
    fn default() -> Self {
        Self::new(&AdaptationConfig::default())
    }
}
