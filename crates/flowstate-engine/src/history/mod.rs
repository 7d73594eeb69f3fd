//! History ledger of validation outcomes.
//!
//! A bounded, time-ordered log. Records are kept newest first; once the
//! ledger holds more than its window the oldest records are evicted, so it
//! always contains the most recent records by timestamp.
//!
//! # Example
//!
//! ```
//! use flowstate_engine::history::{HistoryLedger, ValidationMetrics, ValidationRecord};
//!
//! let mut ledger = HistoryLedger::new(2);
//! for ts in [10, 30, 20] {
//!     let record = ValidationRecord::new(
//!         "type_safety", ts, true, 0.5, ["editor"], ValidationMetrics::default(),
//!     ).unwrap();
//!     ledger.append(record);
//! }
//!
//! let stamps: Vec<u64> = ledger.iter().map(|r| r.timestamp_ms()).collect();
//! assert_eq!(stamps, vec![30, 20]);
//! ```

mod record;

pub use record::{ValidationMetrics, ValidationRecord};

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

/// Bounded log of validation records, sorted descending by timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryLedger {
    /// Newest first.
    records: VecDeque<ValidationRecord>,

    /// Maximum retained records.
    window: usize,
}

impl HistoryLedger {
    /// Create an empty ledger with the given window.
    ///
    /// A zero window is raised to one.
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            records: VecDeque::with_capacity(window),
            window,
        }
    }

    /// Insert a record at its timestamp position and evict overflow.
    ///
    /// Among equal timestamps the newly inserted record goes first. Returns
    /// the number of evicted records.
    pub fn append(&mut self, record: ValidationRecord) -> usize {
        let ts = record.timestamp_ms();
        let position = self
            .records
            .iter()
            .position(|r| r.timestamp_ms() <= ts)
            .unwrap_or(self.records.len());
        self.records.insert(position, record);

        let mut evicted = 0;
        while self.records.len() > self.window {
            self.records.pop_back();
            evicted += 1;
        }
        evicted
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Configured window.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Iterate newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationRecord> {
        self.records.iter()
    }

    /// Most recent record.
    pub fn latest(&self) -> Option<&ValidationRecord> {
        self.records.front()
    }

    /// Records of one category, newest first.
    pub fn for_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a ValidationRecord> + 'a {
        self.records.iter().filter(move |r| r.category() == category)
    }

    /// Records of one category sharing at least one tag with `tags`.
    pub fn related<'a>(
        &'a self,
        category: &'a str,
        tags: &'a BTreeSet<String>,
    ) -> impl Iterator<Item = &'a ValidationRecord> + 'a {
        self.for_category(category)
            .filter(move |r| r.shares_context(tags))
    }

    /// Categories with at least one record, sorted.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.records.iter().map(|r| r.category()).collect()
    }

    /// Remove every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl Default for HistoryLedger {
    fn default() -> Self {
        Self::new(crate::config::HISTORY_WINDOW)
    }
}
