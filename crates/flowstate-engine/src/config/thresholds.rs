//! Seed values for the adaptive threshold categories.

use serde::{Deserialize, Serialize};

/// Category name: structural/type validation.
pub const TYPE_SAFETY: &str = "type_safety";

/// Category name: coherence of matched patterns.
pub const PATTERN_COHERENCE: &str = "pattern_coherence";

/// Category name: protection of an active flow session.
pub const FLOW_PROTECTION: &str = "flow_protection";

/// Initial values for one threshold category.
///
/// The store copies these at engine start; afterwards only the adapter
/// changes the correction factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSeed {
    /// Category name (unique key).
    pub category: String,

    /// Base value in `[0, 1]`.
    pub base: f32,

    /// Initial weight of the caller-supplied energy level.
    pub energy_factor: f32,

    /// Initial weight of the context-tag resonance.
    pub context_factor: f32,

    /// Initial weight of the historical success rate.
    pub history_factor: f32,

    /// Hard lower clamp.
    pub min_value: f32,

    /// Hard upper clamp.
    pub max_value: f32,
}

impl ThresholdSeed {
    /// Seed for the `type_safety` category.
    pub fn type_safety() -> Self {
        Self {
            category: TYPE_SAFETY.to_string(),
            base: 0.70,
            energy_factor: 0.10,
            context_factor: 0.10,
            history_factor: 0.10,
            min_value: 0.50,
            max_value: 0.95,
        }
    }

    /// Seed for the `pattern_coherence` category.
    pub fn pattern_coherence() -> Self {
        Self {
            category: PATTERN_COHERENCE.to_string(),
            base: 0.60,
            energy_factor: 0.10,
            context_factor: 0.15,
            history_factor: 0.10,
            min_value: 0.40,
            max_value: 0.90,
        }
    }

    /// Seed for the `flow_protection` category.
    pub fn flow_protection() -> Self {
        Self {
            category: FLOW_PROTECTION.to_string(),
            base: 0.65,
            energy_factor: 0.15,
            context_factor: 0.10,
            history_factor: 0.10,
            min_value: 0.45,
            max_value: 0.92,
        }
    }

    /// Validate the seed.
    pub fn validate(&self) -> Result<(), String> {
        if self.category.trim().is_empty() {
            return Err("Threshold category cannot be empty".to_string());
        }
        let unit_fields = [
            ("base", self.base),
            ("energy_factor", self.energy_factor),
            ("context_factor", self.context_factor),
            ("history_factor", self.history_factor),
            ("min_value", self.min_value),
            ("max_value", self.max_value),
        ];
        for (name, value) in unit_fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!(
                    "{}.{} must be in [0, 1], got {}",
                    self.category, name, value
                ));
            }
        }
        if self.min_value > self.max_value {
            return Err(format!(
                "{}: min_value ({}) must be <= max_value ({})",
                self.category, self.min_value, self.max_value
            ));
        }
        Ok(())
    }
}

/// Threshold categories seeded at engine start.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdsConfig {
    /// One seed per category.
    pub categories: Vec<ThresholdSeed>,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            categories: vec![
                ThresholdSeed::type_safety(),
                ThresholdSeed::pattern_coherence(),
                ThresholdSeed::flow_protection(),
            ],
        }
    }
}

impl ThresholdsConfig {
    /// Validate all seeds and reject duplicate category names.
    pub fn validate(&self) -> Result<(), String> {
        if self.categories.is_empty() {
            return Err("At least one threshold category is required".to_string());
        }
        for (i, seed) in self.categories.iter().enumerate() {
            seed.validate()?;
            if self.categories[..i]
                .iter()
                .any(|other| other.category == seed.category)
            {
                return Err(format!("Duplicate threshold category: {}", seed.category));
            }
        }
        Ok(())
    }
}
