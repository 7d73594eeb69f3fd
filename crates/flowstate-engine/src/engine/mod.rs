//! Engine facade.
//!
//! [`FlowEngine`] wires the threshold store, history ledger, pattern
//! registry, flow-state machine and preservation ledger to one logical clock.
//! Time only moves through [`FlowEngine::advance`].
//!
//! # Module Structure
//!
//! - `types` - Engine struct
//! - `core` - Construction, accessors, observations and thresholds
//! - `operations` - Pattern, flow and preservation operations
//! - `ticks` - Time advancement and timer dispatch

mod core;
mod operations;
mod ticks;
mod types;


pub use types::FlowEngine;
