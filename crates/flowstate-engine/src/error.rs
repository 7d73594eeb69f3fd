//! Engine error types.
//!
//! Validation-shape problems (out-of-range metrics, malformed patterns) are
//! reported as [`EngineError::InvalidArgument`]. Lookups of unknown patterns
//! or categories get their own variants so callers can tell "nothing matched"
//! apart from "that id does not exist".

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur inside the flow-state engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid argument value (out of range, NaN, malformed).
    #[error("Invalid argument '{name}': {value}. {reason}")]
    InvalidArgument {
        /// Argument name
        name: String,
        /// Argument value as string
        value: String,
        /// Reason for rejection
        reason: String,
    },

    /// Threshold category is not registered in the store.
    #[error("Unknown threshold category: {0}")]
    CategoryNotFound(String),

    /// Pattern id is not registered.
    #[error("Unknown pattern: {0}")]
    PatternNotFound(Uuid),

    /// Flow-state transition is not allowed from the current state.
    #[error("Invalid flow transition from {from} to {to}: {reason}")]
    InvalidTransition {
        /// Source state
        from: String,
        /// Target state
        to: String,
        /// Reason for rejection
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::SerializationError(err.to_string())
    }
}

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::ConfigError(err.to_string())
    }
}

impl EngineError {
    /// Create an invalid argument error.
    pub fn invalid_argument(
        name: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        EngineError::InvalidArgument {
            name: name.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a flow transition error.
    pub fn invalid_transition(
        from: impl Into<String>,
        to: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        EngineError::InvalidTransition {
            from: from.into(),
            to: to.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error is recoverable (the caller can retry on a later tick
    /// or with different arguments).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidArgument { .. } | EngineError::InvalidTransition { .. }
        )
    }

    /// Check if this error refers to an id the engine does not know.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::CategoryNotFound(_) | EngineError::PatternNotFound(_)
        )
    }
}

/// Reject non-finite values and values outside `[0, 1]`.
pub(crate) fn ensure_unit(name: &str, value: f32) -> EngineResult<f32> {
    if !value.is_finite() {
        return Err(EngineError::invalid_argument(
            name,
            value,
            "Value must be finite",
        ));
    }
    if !(0.0..=1.0).contains(&value) {
        return Err(EngineError::invalid_argument(
            name,
            value,
            "Must be in range [0, 1]",
        ));
    }
    Ok(value)
}
