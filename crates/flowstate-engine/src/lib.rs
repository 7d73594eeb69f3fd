//! Adaptive validation and flow-state engine.
//!
//! This crate tracks a user's attention ("flow") state, adapts validation
//! thresholds from the recent history of outcomes, scores weighted patterns
//! against observations, and keeps quality-gated snapshots of the session.
//!
//! # Modules
//!
//! - [`config`]: Configuration types and loading
//! - [`error`]: Error types and result aliases
//! - [`history`]: Bounded ledger of validation outcomes
//! - [`threshold`]: Adaptive thresholds and the adaptation cycle
//! - [`pattern`]: Pattern registry and matcher
//! - [`flow`]: Flow-state machine and protection health
//! - [`preservation`]: Quality-gated state snapshots
//! - [`scheduler`]: Logical-time interval scheduler
//! - [`events`]: Event broadcasting and state subscriptions
//! - [`engine`]: The [`FlowEngine`] facade
//! - [`driver`]: Optional tokio loop advancing a shared engine
//!
//! # Flow Bands
//!
//! ```text
//! average >  0.95  HYPERFOCUS
//! average >  0.85  FLOW
//! average >  0.70  FOCUS
//! average <  0.30  EXHAUSTED
//! otherwise        unchanged
//! ```
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use flowstate_engine::{FlowEngine, FlowType, Observation, Pattern, PatternConditions};
//!
//! let mut engine = FlowEngine::default();
//! engine
//!     .register_pattern(Pattern::new(
//!         "deep-work",
//!         PatternConditions::default().with_min_field_strength(0.8),
//!         1.0,
//!     ))
//!     .unwrap();
//!
//! assert!(engine.start_flow());
//! engine.advance(Duration::from_secs(10));
//! assert_eq!(engine.flow_state().flow_type, FlowType::Focus);
//!
//! let matches = engine
//!     .find_matches(&Observation::new(0.9, 0.4, 0.1, FlowType::Focus))
//!     .unwrap();
//! assert_eq!(matches[0].name, "deep-work");
//! ```

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod events;
pub mod flow;
pub mod history;
pub mod pattern;
pub mod preservation;
pub mod scheduler;
pub mod threshold;

pub use config::EngineConfig;
pub use engine::FlowEngine;
pub use error::{EngineError, EngineResult};

// Re-export the types most callers touch
pub use events::{FlowEvent, FlowEventListener};
pub use flow::{FlowIntensity, FlowMetrics, FlowState, FlowType, ProtectionMetrics};
pub use history::ValidationMetrics;
pub use pattern::{ConditionValue, Observation, Pattern, PatternConditions, PatternId, PatternMatch};
pub use preservation::PreservedState;
