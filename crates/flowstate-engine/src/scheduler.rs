//! Deterministic logical-time interval scheduler.
//!
//! Stands in for wall-clock interval timers. Time only moves when the owner
//! calls [`TickScheduler::pop_due`] / [`TickScheduler::settle`], so tests can
//! advance minutes of session time instantly and reproducibly.
//!
//! Firings are handed out one at a time in chronological order (ties broken
//! by timer id). The caller runs each to completion before asking for the
//! next one; a timer cancelled in between never fires again.
//!
//! # Example
//!
//! ```
//! use flowstate_engine::scheduler::TickScheduler;
//!
//! let mut scheduler: TickScheduler<&'static str> = TickScheduler::new();
//! let fast = scheduler.schedule_interval("fast", 100);
//! scheduler.schedule_interval("slow", 250);
//!
//! let mut fired = Vec::new();
//! while let Some(firing) = scheduler.pop_due(300) {
//!     fired.push((firing.task, firing.at_ms));
//! }
//! scheduler.settle(300);
//!
//! assert_eq!(fired, vec![("fast", 100), ("fast", 200), ("slow", 250), ("fast", 300)]);
//! assert!(scheduler.cancel(fast));
//! assert!(!scheduler.cancel(fast));
//! ```

use serde::{Deserialize, Serialize};

/// Periodic activities of a flow engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineTask {
    /// Threshold adaptation cycle.
    Adaptation,
    /// Flow duration accumulation.
    FlowDuration,
    /// Flow metrics update.
    FlowMetrics,
}

/// Handle of a scheduled interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(u64);

impl TimerId {
    /// Raw numeric id.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// A due interval firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Firing<K> {
    /// Timer that fired.
    pub id: TimerId,
    /// Task kind registered with the timer.
    pub task: K,
    /// Logical time of the firing in milliseconds.
    pub at_ms: u64,
}

#[derive(Debug, Clone)]
struct IntervalTimer<K> {
    id: TimerId,
    task: K,
    period_ms: u64,
    next_due_ms: u64,
}

/// Cooperative scheduler over logical milliseconds.
#[derive(Debug, Clone)]
pub struct TickScheduler<K> {
    now_ms: u64,
    next_id: u64,
    timers: Vec<IntervalTimer<K>>,
}

impl<K: Copy> TickScheduler<K> {
    /// Create a scheduler at logical time zero.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create a scheduler at the given logical time.
    pub fn starting_at(now_ms: u64) -> Self {
        Self {
            now_ms,
            next_id: 1,
            timers: Vec::new(),
        }
    }

    /// Current logical time.
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Register a repeating task; the first firing is one period from now.
    ///
    /// A zero period is treated as one millisecond so the scheduler can
    /// always make progress.
    pub fn schedule_interval(&mut self, task: K, period_ms: u64) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let period_ms = period_ms.max(1);
        self.timers.push(IntervalTimer {
            id,
            task,
            period_ms,
            next_due_ms: self.now_ms.saturating_add(period_ms),
        });
        id
    }

    /// Cancel a timer.
    ///
    /// Returns `false` when the id is unknown or already cancelled; that is
    /// never an error.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Whether the timer is still scheduled.
    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    /// Number of scheduled timers.
    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }

    /// Pop the earliest firing due at or before `until_ms`.
    ///
    /// Advances logical time to the firing and reschedules the timer for its
    /// next period.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Firing<K>> {
        let timer = self
            .timers
            .iter_mut()
            .filter(|t| t.next_due_ms <= until_ms)
            .min_by_key(|t| (t.next_due_ms, t.id))?;

        let firing = Firing {
            id: timer.id,
            task: timer.task,
            at_ms: timer.next_due_ms,
        };
        timer.next_due_ms = timer.next_due_ms.saturating_add(timer.period_ms);
        self.now_ms = self.now_ms.max(firing.at_ms);
        Some(firing)
    }

    /// Move logical time forward to `until_ms` once all firings are drained.
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}

impl<K: Copy> Default for TickScheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}
