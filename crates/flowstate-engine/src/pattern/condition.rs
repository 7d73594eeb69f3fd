//! Pattern match conditions.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_unit, EngineError, EngineResult};
use crate::flow::FlowType;

/// Condition key of the required flow state.
pub const FLOW_STATE_KEY: &str = "flow_state";
/// Condition key of the minimum field strength.
pub const MIN_FIELD_STRENGTH_KEY: &str = "min_field_strength";
/// Condition key of the minimum resonance amplitude.
pub const MIN_RESONANCE_KEY: &str = "min_resonance";
/// Condition key of the maximum resistance.
pub const MAX_RESISTANCE_KEY: &str = "max_resistance";

/// Keys reserved for the typed conditions.
pub const BUILT_IN_KEYS: [&str; 4] = [
    FLOW_STATE_KEY,
    MIN_FIELD_STRENGTH_KEY,
    MIN_RESONANCE_KEY,
    MAX_RESISTANCE_KEY,
];

/// Value of an extension condition or observation attribute.
///
/// A `Number` condition is a lower bound on the observed number; `Bool` and
/// `Text` conditions require equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Bool(bool),
    Number(f32),
    Text(String),
}

impl ConditionValue {
    /// Short type name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ConditionValue::Bool(_) => "bool",
            ConditionValue::Number(_) => "number",
            ConditionValue::Text(_) => "text",
        }
    }

    pub(crate) fn validate(&self, key: &str) -> EngineResult<()> {
        match self {
            ConditionValue::Number(n) if !n.is_finite() => Err(EngineError::invalid_argument(
                key,
                n,
                "Numeric values must be finite",
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionValue::Bool(b) => write!(f, "{b}"),
            ConditionValue::Number(n) => write!(f, "{n}"),
            ConditionValue::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for ConditionValue {
    fn from(value: bool) -> Self {
        ConditionValue::Bool(value)
    }
}

impl From<f32> for ConditionValue {
    fn from(value: f32) -> Self {
        ConditionValue::Number(value)
    }
}

impl From<&str> for ConditionValue {
    fn from(value: &str) -> Self {
        ConditionValue::Text(value.to_string())
    }
}

impl From<String> for ConditionValue {
    fn from(value: String) -> Self {
        ConditionValue::Text(value)
    }
}

/// Conditions a pattern requires of an observation.
///
/// Typed conditions cover the built-in observation fields; anything else goes
/// into `extensions`, keyed by attribute name.
///
/// # Example
///
/// ```
/// use flowstate_engine::flow::FlowType;
/// use flowstate_engine::pattern::PatternConditions;
///
/// let conditions = PatternConditions::default()
///     .with_flow_state(FlowType::Flow)
///     .with_min_field_strength(0.8)
///     .with_extension("pairing", true);
/// assert_eq!(conditions.condition_count(), 3);
/// assert!(conditions.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConditions {
    /// Required flow state.
    pub flow_state: Option<FlowType>,
    /// Minimum observed field strength.
    pub min_field_strength: Option<f32>,
    /// Minimum observed resonance amplitude.
    pub min_resonance: Option<f32>,
    /// Maximum observed resistance.
    pub max_resistance: Option<f32>,
    /// Additional attribute conditions.
    pub extensions: BTreeMap<String, ConditionValue>,
}

impl PatternConditions {
    pub fn with_flow_state(mut self, flow_state: FlowType) -> Self {
        self.flow_state = Some(flow_state);
        self
    }

    pub fn with_min_field_strength(mut self, value: f32) -> Self {
        self.min_field_strength = Some(value);
        self
    }

    pub fn with_min_resonance(mut self, value: f32) -> Self {
        self.min_resonance = Some(value);
        self
    }

    pub fn with_max_resistance(mut self, value: f32) -> Self {
        self.max_resistance = Some(value);
        self
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<ConditionValue>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    /// Number of present conditions.
    pub fn condition_count(&self) -> usize {
        usize::from(self.flow_state.is_some())
            + usize::from(self.min_field_strength.is_some())
            + usize::from(self.min_resonance.is_some())
            + usize::from(self.max_resistance.is_some())
            + self.extensions.len()
    }

    /// Whether no condition is present.
    pub fn is_empty(&self) -> bool {
        self.condition_count() == 0
    }

    /// Check thresholds lie in `[0, 1]` and extension entries are well formed.
    pub fn validate(&self) -> EngineResult<()> {
        if let Some(v) = self.min_field_strength {
            ensure_unit(MIN_FIELD_STRENGTH_KEY, v)?;
        }
        if let Some(v) = self.min_resonance {
            ensure_unit(MIN_RESONANCE_KEY, v)?;
        }
        if let Some(v) = self.max_resistance {
            ensure_unit(MAX_RESISTANCE_KEY, v)?;
        }

        for (key, value) in &self.extensions {
            if key.trim().is_empty() {
                return Err(EngineError::invalid_argument(
                    "extension key",
                    key,
                    "Extension keys must not be empty",
                ));
            }
            if BUILT_IN_KEYS.contains(&key.as_str()) {
                return Err(EngineError::invalid_argument(
                    "extension key",
                    key,
                    "Extension keys must not shadow built-in conditions",
                ));
            }
            value.validate(key)?;
        }
        Ok(())
    }
}
