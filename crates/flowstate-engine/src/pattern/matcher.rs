//! Scoring patterns against observations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::condition::{
    ConditionValue, FLOW_STATE_KEY, MAX_RESISTANCE_KEY, MIN_FIELD_STRENGTH_KEY, MIN_RESONANCE_KEY,
};
use super::registry::{Pattern, PatternId};
use crate::error::{ensure_unit, EngineError, EngineResult};
use crate::flow::FlowType;

/// What the engine currently sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Field strength in `[0, 1]`.
    pub field_strength: f32,
    /// Resonance amplitude in `[0, 1]`.
    pub resonance_amplitude: f32,
    /// Resistance in `[0, 1]`.
    pub resistance: f32,
    /// Current flow state.
    pub flow_state: FlowType,
    /// Values checked by extension conditions.
    #[serde(default)]
    pub attributes: BTreeMap<String, ConditionValue>,
}

impl Observation {
    pub fn new(
        field_strength: f32,
        resonance_amplitude: f32,
        resistance: f32,
        flow_state: FlowType,
    ) -> Self {
        Self {
            field_strength,
            resonance_amplitude,
            resistance,
            flow_state,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<ConditionValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Reject out-of-range readings and non-finite attribute numbers.
    pub fn validate(&self) -> EngineResult<()> {
        ensure_unit("field_strength", self.field_strength)?;
        ensure_unit("resonance_amplitude", self.resonance_amplitude)?;
        ensure_unit("resistance", self.resistance)?;
        for (key, value) in &self.attributes {
            if let ConditionValue::Number(n) = value {
                if !n.is_finite() {
                    return Err(EngineError::invalid_argument(
                        key.as_str(),
                        n,
                        "Attribute numbers must be finite",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// A pattern that matched an observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub pattern_id: PatternId,
    pub name: String,
    /// Mean condition score in `[0, 1]`.
    pub confidence: f32,
    /// `confidence * weight`.
    pub score: f32,
    /// Keys of the conditions that matched, in evaluation order.
    pub matched_conditions: Vec<String>,
}

/// Score one pattern, `None` when any present condition fails.
///
/// Conditions are evaluated as flow state, field strength, resonance,
/// resistance, then extensions in key order. Equality conditions score 1;
/// threshold conditions score the observed value (`1 - resistance` for the
/// resistance ceiling); numeric extensions score the observed number clamped
/// to `[0, 1]`. A pattern without conditions has zero confidence and never
/// matches.
pub(crate) fn evaluate(pattern: &Pattern, observation: &Observation) -> Option<PatternMatch> {
    let conditions = &pattern.conditions;
    let mut matched = Vec::with_capacity(conditions.condition_count());
    let mut total = 0.0f32;

    if let Some(required) = conditions.flow_state {
        if observation.flow_state != required {
            return None;
        }
        matched.push(FLOW_STATE_KEY.to_string());
        total += 1.0;
    }

    if let Some(min) = conditions.min_field_strength {
        if observation.field_strength < min {
            return None;
        }
        matched.push(MIN_FIELD_STRENGTH_KEY.to_string());
        total += observation.field_strength;
    }

    if let Some(min) = conditions.min_resonance {
        if observation.resonance_amplitude < min {
            return None;
        }
        matched.push(MIN_RESONANCE_KEY.to_string());
        total += observation.resonance_amplitude;
    }

    if let Some(max) = conditions.max_resistance {
        if observation.resistance > max {
            return None;
        }
        matched.push(MAX_RESISTANCE_KEY.to_string());
        total += 1.0 - observation.resistance;
    }

    for (key, expected) in &conditions.extensions {
        let score = extension_score(expected, observation.attributes.get(key)?)?;
        matched.push(key.clone());
        total += score;
    }

    if matched.is_empty() {
        return None;
    }

    let confidence = (total / matched.len() as f32).clamp(0.0, 1.0);
    if confidence <= 0.0 {
        return None;
    }

    Some(PatternMatch {
        pattern_id: pattern.id(),
        name: pattern.name.clone(),
        confidence,
        score: confidence * pattern.weight,
        matched_conditions: matched,
    })
}

fn extension_score(expected: &ConditionValue, observed: &ConditionValue) -> Option<f32> {
    match (expected, observed) {
        (ConditionValue::Number(min), ConditionValue::Number(value)) if value >= min => {
            Some(value.clamp(0.0, 1.0))
        }
        (ConditionValue::Bool(a), ConditionValue::Bool(b)) if a == b => Some(1.0),
        (ConditionValue::Text(a), ConditionValue::Text(b)) if a == b => Some(1.0),
        _ => None,
    }
}
