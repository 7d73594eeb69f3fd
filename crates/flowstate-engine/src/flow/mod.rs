//! Flow-state tracking.
//!
//! A session moves through attention states driven by rolling metrics:
//!
//! ```text
//! RESTING -> FOCUS -> FLOW -> HYPERFOCUS
//!              any active state may degrade to EXHAUSTED
//! active --end_flow--> RECOVERING --cooldown--> RESTING
//! ```
//!
//! Classification uses the unweighted mean of the seven core metrics
//! (resistance inverted) against the configured [`FlowBands`](crate::config::FlowBands).

pub mod machine;
pub mod protection;
pub mod state;

pub use machine::{CooldownPolicy, ElapsedCooldown, FlowStateMachine, MetricsUpdate, Transition};
pub use protection::{ProtectionMetrics, ProtectionState};
pub use state::{FlowIntensity, FlowMetrics, FlowState, FlowType};
