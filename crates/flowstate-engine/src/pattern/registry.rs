//! Pattern registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::condition::PatternConditions;
use super::matcher::{evaluate, Observation, PatternMatch};
use crate::config::PatternConfig;
use crate::error::{EngineError, EngineResult};

/// Identifier of a registered pattern.
pub type PatternId = Uuid;

/// A named, weighted set of match conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    id: PatternId,
    /// Human-readable name.
    pub name: String,
    /// Conditions an observation must meet.
    pub conditions: PatternConditions,
    /// Score multiplier; finite and non-negative.
    pub weight: f32,
    activations: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Pattern {
    /// Create a pattern with a fresh id.
    pub fn new(name: impl Into<String>, conditions: PatternConditions, weight: f32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            conditions,
            weight,
            activations: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn id(&self) -> PatternId {
        self.id
    }

    /// Number of times the pattern was activated.
    #[inline]
    pub fn activations(&self) -> u64 {
        self.activations
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[inline]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Check weight and conditions.
    pub fn validate(&self) -> EngineResult<()> {
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(EngineError::invalid_argument(
                "weight",
                self.weight,
                "Weight must be finite and non-negative",
            ));
        }
        self.conditions.validate()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Registry of patterns in registration order.
///
/// # Example
///
/// ```
/// use flowstate_engine::config::PatternConfig;
/// use flowstate_engine::flow::FlowType;
/// use flowstate_engine::pattern::{Observation, Pattern, PatternConditions, PatternRegistry};
///
/// let mut registry = PatternRegistry::new(&PatternConfig::default());
/// let id = registry
///     .add(Pattern::new(
///         "deep-work",
///         PatternConditions::default().with_min_field_strength(0.8),
///         1.0,
///     ))
///     .unwrap();
///
/// let matches = registry
///     .find_matches(&Observation::new(0.9, 0.5, 0.2, FlowType::Flow))
///     .unwrap();
/// assert_eq!(matches.len(), 1);
/// assert_eq!(matches[0].pattern_id, id);
/// assert!((matches[0].score - 0.9).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    patterns: Vec<Pattern>,
    weight_learning_rate: f32,
    max_weight: f32,
}

impl PatternRegistry {
    pub fn new(config: &PatternConfig) -> Self {
        Self {
            patterns: Vec::new(),
            weight_learning_rate: config.weight_learning_rate,
            max_weight: config.max_weight,
        }
    }

    /// Register a pattern.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidArgument`] when the pattern is malformed or its
    /// id is already registered.
    pub fn add(&mut self, pattern: Pattern) -> EngineResult<PatternId> {
        pattern.validate()?;
        if self.position(pattern.id).is_some() {
            return Err(EngineError::invalid_argument(
                "pattern.id",
                pattern.id,
                "Pattern id is already registered",
            ));
        }

        let id = pattern.id;
        tracing::debug!(pattern_id = %id, name = %pattern.name, "pattern registered");
        self.patterns.push(pattern);
        Ok(id)
    }

    /// Remove a pattern; unknown ids yield `None`.
    pub fn remove(&mut self, id: PatternId) -> Option<Pattern> {
        let index = self.position(id)?;
        Some(self.patterns.remove(index))
    }

    /// Edit a pattern in place.
    ///
    /// The edit is applied to a copy and only kept if the result still
    /// validates; the id, activation counter and creation time cannot be
    /// changed. Returns `false` for unknown ids and rejected edits.
    pub fn update<F>(&mut self, id: PatternId, f: F) -> bool
    where
        F: FnOnce(&mut Pattern),
    {
        let Some(index) = self.position(id) else {
            return false;
        };

        let current = &self.patterns[index];
        let mut edited = current.clone();
        f(&mut edited);
        edited.id = current.id;
        edited.activations = current.activations;
        edited.created_at = current.created_at;

        if let Err(err) = edited.validate() {
            tracing::warn!(pattern_id = %id, error = %err, "pattern update rejected");
            return false;
        }

        edited.touch();
        self.patterns[index] = edited;
        true
    }

    /// Increment a pattern's activation counter.
    ///
    /// # Errors
    ///
    /// [`EngineError::PatternNotFound`] for unknown ids.
    pub fn activate(&mut self, id: PatternId) -> EngineResult<u64> {
        let pattern = self.get_mut(id)?;
        pattern.activations = pattern.activations.saturating_add(1);
        pattern.touch();
        Ok(pattern.activations)
    }

    /// Nudge a pattern's weight after an outcome.
    ///
    /// ```text
    /// success: w' = max(w, w + rate * (max_weight - w))
    /// failure: w' = w - rate * w
    /// ```
    ///
    /// A weight registered above `max_weight` is held on success and only
    /// decays on failure.
    ///
    /// # Errors
    ///
    /// [`EngineError::PatternNotFound`] for unknown ids.
    pub fn evolve(&mut self, id: PatternId, success: bool) -> EngineResult<f32> {
        let rate = self.weight_learning_rate;
        let target = if success { self.max_weight } else { 0.0 };

        let pattern = self.get_mut(id)?;
        let nudged = pattern.weight + rate * (target - pattern.weight);
        pattern.weight = if success {
            nudged.max(pattern.weight)
        } else {
            nudged.max(0.0)
        };
        pattern.touch();
        Ok(pattern.weight)
    }

    /// Score every pattern against an observation.
    ///
    /// Matches are ordered by descending score; equal scores keep registration
    /// order. An empty result means nothing matched.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidArgument`] when the observation is malformed.
    pub fn find_matches(&self, observation: &Observation) -> EngineResult<Vec<PatternMatch>> {
        observation.validate()?;

        let mut matches: Vec<PatternMatch> = self
            .patterns
            .iter()
            .filter_map(|pattern| evaluate(pattern, observation))
            .collect();
        // `sort_by` is stable, which keeps registration order on ties.
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(matches)
    }

    pub fn get(&self, id: PatternId) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: PatternId) -> bool {
        self.position(id).is_some()
    }

    /// Patterns in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    fn position(&self, id: PatternId) -> Option<usize> {
        self.patterns.iter().position(|p| p.id == id)
    }

    fn get_mut(&mut self, id: PatternId) -> EngineResult<&mut Pattern> {
        self.patterns
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(EngineError::PatternNotFound(id))
    }
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::new(&PatternConfig::default())
    }
}
