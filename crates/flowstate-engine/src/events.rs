//! Engine events and subscriptions.
//!
//! [`FlowEventBroadcaster`] fans engine events out to registered listeners.
//! [`StateSubject`] caches the latest value of a piece of state and replays
//! it to every new subscriber before forwarding later updates.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::flow::{FlowType, Transition};
use crate::pattern::PatternId;

/// Events emitted by a flow engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FlowEvent {
    /// A flow session started.
    FlowStarted { at_ms: u64 },
    /// A flow session ended and recovery began.
    FlowEnded {
        from: FlowType,
        duration_ms: u64,
        at_ms: u64,
    },
    /// The flow state changed outside session start/end.
    Transition(Transition),
    /// An adaptation cycle updated the listed categories.
    ThresholdsAdapted { categories: Vec<String>, at_ms: u64 },
    /// A snapshot passed the preservation gate.
    StatePreserved { timestamp_ms: i64, coherence: f32 },
    /// A pattern's activation counter moved.
    PatternActivated { pattern_id: PatternId, activations: u64 },
}

/// Receives engine events.
pub trait FlowEventListener: Send + Sync {
    fn on_event(&self, event: &FlowEvent);
}

impl<F> FlowEventListener for F
where
    F: Fn(&FlowEvent) + Send + Sync,
{
    fn on_event(&self, event: &FlowEvent) {
        self(event)
    }
}

/// Broadcasts engine events to listeners.
///
/// Clones share the same listener list.
#[derive(Clone, Default)]
pub struct FlowEventBroadcaster {
    listeners: Arc<RwLock<Vec<Box<dyn FlowEventListener>>>>,
}

impl fmt::Debug for FlowEventBroadcaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowEventBroadcaster")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl FlowEventBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for engine events.
    pub fn register_listener(&self, listener: Box<dyn FlowEventListener>) {
        let mut listeners = self.listeners.write();
        tracing::debug!(
            "Registering flow event listener (total: {})",
            listeners.len() + 1
        );
        listeners.push(listener);
    }

    /// Get the number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn broadcast(&self, event: &FlowEvent) {
        let listeners = self.listeners.read();
        for listener in listeners.iter() {
            listener.on_event(event);
        }
    }
}

/// Handle returned by [`StateSubject::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Last-value cache with change callbacks.
///
/// # Example
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use flowstate_engine::events::StateSubject;
///
/// let mut subject = StateSubject::new(1);
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
/// let id = subject.subscribe(move |v: &i32| sink.lock().unwrap().push(*v));
///
/// subject.publish(2);
/// assert!(subject.unsubscribe(id));
/// subject.publish(3);
///
/// assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
/// assert_eq!(*subject.get(), 3);
/// ```
pub struct StateSubject<T> {
    value: T,
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Callback<T>)>,
}

impl<T> StateSubject<T> {
    pub fn new(initial: T) -> Self {
        Self {
            value: initial,
            next_id: 1,
            subscribers: Vec::new(),
        }
    }

    /// Latest published value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Subscribe to updates; the callback immediately receives the current
    /// value.
    pub fn subscribe(&mut self, callback: impl Fn(&T) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        callback(&self.value);
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Drop a subscription; unknown ids return `false`.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Store a new value and notify subscribers.
    pub fn publish(&mut self, value: T) {
        self.value = value;
        for (_, callback) in &self.subscribers {
            callback(&self.value);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<T: fmt::Debug> fmt::Debug for StateSubject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSubject")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
