//! Weighted pattern registry and matcher.
//!
//! Patterns pair a set of conditions with a weight. Matching an
//! [`Observation`] yields a confidence (mean condition score) and a score
//! (`confidence * weight`); any failed condition excludes the pattern.

mod condition;
mod matcher;
mod registry;

pub use condition::{
    ConditionValue, PatternConditions, BUILT_IN_KEYS, FLOW_STATE_KEY, MAX_RESISTANCE_KEY,
    MIN_FIELD_STRENGTH_KEY, MIN_RESONANCE_KEY,
};
pub use matcher::{Observation, PatternMatch};
pub use registry::{Pattern, PatternId, PatternRegistry};
