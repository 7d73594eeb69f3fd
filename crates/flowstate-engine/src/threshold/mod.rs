//! Adaptive validation thresholds.
//!
//! - [`ThresholdStore`]: per-category base values and correction factors,
//!   evaluated against the history ledger and clamped to hard bounds
//! - [`ThresholdAdapter`]: periodic cycle nudging correction factors toward
//!   observed correlations
//! - [`stats`]: Pearson correlation, Jaccard similarity and success rates
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeSet;
//! use flowstate_engine::history::HistoryLedger;
//! use flowstate_engine::threshold::ThresholdStore;
//!
//! let store = ThresholdStore::default();
//! let ledger = HistoryLedger::default();
//! let tags: BTreeSet<String> = ["editor".to_string()].into_iter().collect();
//!
//! let value = store.calculate("type_safety", 0.4, &tags, &ledger).unwrap();
//! let bounds = store.get("type_safety").unwrap();
//! assert!(value >= bounds.min_value && value <= bounds.max_value);
//! ```

mod adapter;
pub mod stats;
mod store;

pub use adapter::{AdaptationReport, CategoryCorrelates, ThresholdAdapter};
pub use store::{Threshold, ThresholdStore};
