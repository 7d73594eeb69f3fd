//! Integration tests for the flowstate engine.
//!
//! Drives a [`FlowEngine`](flowstate_engine::FlowEngine) through its public
//! surface only, advancing logical time explicitly.
//!
//! # Test Modules
//!
//! 1. `threshold_tests` - Clamping, history-driven adaptation
//! 2. `pattern_tests` - Matching, exclusion, ranking, registry edits
//! 3. `flow_tests` - Session lifecycle, protection gating, cooldown
//! 4. `preservation_tests` - Quality gate, ring eviction, restore
//! 5. `engine_tests` - Configuration loading, events, end-to-end session


pub mod flow_tests;
pub mod pattern_tests;
pub mod preservation_tests;
pub mod threshold_tests;
