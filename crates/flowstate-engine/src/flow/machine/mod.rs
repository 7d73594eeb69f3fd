//! Flow-state machine.
//!
//! Tracks a single attention session through RESTING, FOCUS, FLOW,
//! HYPERFOCUS, EXHAUSTED and RECOVERING. Timers live in a caller-owned
//! [`TickScheduler`](crate::scheduler::TickScheduler); the machine only keeps
//! the ids of the timers it registered.
//!
//! # Module Structure
//!
//! - `types` - Machine struct and transition records
//! - `core` - Construction and accessors
//! - `transitions` - Session start/end, recovery and classification
//! - `ticks` - Duration and metrics tick handlers
//! - `cooldown` - Recovery completion policies

mod cooldown;
mod core;
mod ticks;
mod transitions;
mod types;

#[cfg(test)]
mod tests_core;
#[cfg(test)]
mod tests_transitions;

pub use cooldown::{CooldownPolicy, ElapsedCooldown};
pub use types::{FlowStateMachine, MetricsUpdate, Transition};
