//! Wall-clock driver for a shared engine.
//!
//! Advances an engine behind `Arc<tokio::sync::Mutex<_>>` by a fixed tick on
//! a [`tokio::time::interval`] until shut down. On shutdown any active flow
//! session is ended.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::engine::FlowEngine;

/// Handle of a running driver task.
#[derive(Debug)]
pub struct DriverHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl DriverHandle {
    /// Signal shutdown and wait for the driver to stop.
    pub async fn shutdown(self) {
        // A closed channel means the task is already gone.
        let _ = self.shutdown.send(true);
        if let Err(err) = self.task.await {
            tracing::warn!(error = %err, "flow driver task failed");
        }
    }

    /// Whether the driver task has finished.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn a driver advancing `engine` by `tick` every `tick` of wall time.
///
/// Must be called inside a tokio runtime.
pub fn spawn(engine: Arc<Mutex<FlowEngine>>, tick: Duration) -> DriverHandle {
    let (shutdown, receiver) = watch::channel(false);
    let task = tokio::spawn(run(engine, tick, receiver));
    DriverHandle { shutdown, task }
}

/// Driver loop; returns once `shutdown` turns `true` or its sender is dropped.
pub async fn run(engine: Arc<Mutex<FlowEngine>>, tick: Duration, mut shutdown: watch::Receiver<bool>) {
    let tick = tick.max(Duration::from_millis(1));
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    interval.tick().await;

    tracing::info!(tick_ms = tick.as_millis() as u64, "flow driver started");
    loop {
        tokio::select! {
            _ = interval.tick() => {
                engine.lock().await.advance(tick);
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    let mut engine = engine.lock().await;
    if engine.end_flow() {
        tracing::info!(at_ms = engine.now_ms(), "active flow ended on shutdown");
    }
    tracing::info!("flow driver stopped");
}
