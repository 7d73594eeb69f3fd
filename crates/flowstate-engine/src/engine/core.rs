//! Construction, accessors and the threshold/history surface.

use std::collections::BTreeSet;

use uuid::Uuid;

use super::types::FlowEngine;
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::events::{FlowEvent, FlowEventBroadcaster, FlowEventListener, StateSubject, SubscriptionId};
use crate::flow::{FlowState, FlowStateMachine};
use crate::history::{HistoryLedger, ValidationMetrics, ValidationRecord};
use crate::pattern::PatternRegistry;
use crate::preservation::PreservationLedger;
use crate::scheduler::{EngineTask, TickScheduler};
use crate::threshold::{AdaptationReport, ThresholdAdapter, ThresholdStore};

impl FlowEngine {
    /// Build an engine from configuration.
    ///
    /// The adaptation timer starts immediately; its first cycle runs one
    /// interval after construction.
    ///
    /// # Errors
    ///
    /// [`EngineError::ConfigError`](crate::error::EngineError::ConfigError)
    /// when the configuration does not validate.
    ///
    /// # Example
    ///
    /// ```
    /// use flowstate_engine::config::EngineConfig;
    /// use flowstate_engine::FlowEngine;
    ///
    /// let engine = FlowEngine::new(EngineConfig::default()).unwrap();
    /// assert_eq!(engine.now_ms(), 0);
    /// assert!(!engine.flow_state().active);
    /// ```
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate_checked()?;

        tracing::debug!(
            categories = config.thresholds.categories.len(),
            window = config.history.window,
            "flow engine created"
        );
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        let mut scheduler = TickScheduler::new();
        let adaptation_timer =
            scheduler.schedule_interval(EngineTask::Adaptation, config.adaptation.interval_ms);
        let machine = FlowStateMachine::new(&config.flow);

        Self {
            scheduler,
            adaptation_timer,
            thresholds: ThresholdStore::from_config(&config.thresholds),
            adapter: ThresholdAdapter::new(&config.adaptation),
            history: HistoryLedger::new(config.history.window),
            patterns: PatternRegistry::new(&config.patterns),
            flow_subject: StateSubject::new(machine.state().clone()),
            machine,
            preservation: PreservationLedger::new(&config.preservation),
            space: serde_json::Value::Null,
            events: FlowEventBroadcaster::new(),
            config,
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current logical time in milliseconds.
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn thresholds(&self) -> &ThresholdStore {
        &self.thresholds
    }

    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    pub fn patterns(&self) -> &PatternRegistry {
        &self.patterns
    }

    pub fn flow_machine(&self) -> &FlowStateMachine {
        &self.machine
    }

    pub fn preservation(&self) -> &PreservationLedger {
        &self.preservation
    }

    /// Number of registered interval timers (adaptation plus session timers).
    pub fn active_timers(&self) -> usize {
        self.scheduler.active_timers()
    }

    /// Register a listener for engine events.
    pub fn register_listener(&self, listener: impl FlowEventListener + 'static) {
        self.events.register_listener(Box::new(listener));
    }

    /// Handle to the event broadcaster.
    pub fn events(&self) -> &FlowEventBroadcaster {
        &self.events
    }

    /// Subscribe to flow-state changes; the callback receives the current
    /// state immediately.
    pub fn subscribe_flow(
        &mut self,
        callback: impl Fn(&FlowState) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.flow_subject.subscribe(callback)
    }

    pub fn unsubscribe_flow(&mut self, id: SubscriptionId) -> bool {
        self.flow_subject.unsubscribe(id)
    }

    /// Record the outcome of a validation attempt at the current logical time.
    ///
    /// # Errors
    ///
    /// - [`EngineError::CategoryNotFound`](crate::error::EngineError::CategoryNotFound)
    ///   for categories without a threshold
    /// - [`EngineError::InvalidArgument`](crate::error::EngineError::InvalidArgument)
    ///   for out-of-range energy or metrics
    pub fn observe(
        &mut self,
        category: &str,
        success: bool,
        energy: f32,
        context_tags: impl IntoIterator<Item = impl Into<String>>,
        metrics: ValidationMetrics,
    ) -> EngineResult<Uuid> {
        self.thresholds.get(category)?;
        let record = ValidationRecord::new(
            category,
            self.now_ms(),
            success,
            energy,
            context_tags,
            metrics,
        )?;
        let id = record.id();
        let evicted = self.history.append(record);
        if evicted > 0 {
            tracing::debug!(evicted, "history window full");
        }
        Ok(id)
    }

    /// Effective threshold of a category for the given energy and context.
    pub fn get_threshold(
        &self,
        category: &str,
        energy: f32,
        context_tags: impl IntoIterator<Item = impl Into<String>>,
    ) -> EngineResult<f32> {
        let context: BTreeSet<String> = context_tags.into_iter().map(Into::into).collect();
        self.thresholds
            .calculate(category, energy, &context, &self.history)
    }

    /// Run one adaptation cycle now.
    ///
    /// The periodic timer calls this too; a non-empty report is broadcast as
    /// [`FlowEvent::ThresholdsAdapted`].
    pub fn adapt_thresholds(&mut self) -> AdaptationReport {
        let report = self.adapter.adapt(&mut self.thresholds, &self.history);
        if !report.is_empty() {
            self.events.broadcast(&FlowEvent::ThresholdsAdapted {
                categories: report.adapted.keys().cloned().collect(),
                at_ms: self.now_ms(),
            });
        }
        report
    }
}

impl Default for FlowEngine {
    fn default() -> Self {
        Self::build(EngineConfig::default())
    }
}
