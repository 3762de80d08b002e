//! Periodic geofence evaluation.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::engine::GeofenceEngine;

/// Default time between evaluation passes.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Configuration parameters for the monitor loop.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Time between evaluation passes.
    pub interval: Duration,
}

impl MonitorConfig {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
        }
    }
}

/// Runs evaluation passes on a timer in a background task.
///
/// Starting a running monitor or stopping a stopped one does nothing. The
/// task is aborted when the monitor is dropped.
pub struct Monitor {
    engine: Arc<GeofenceEngine>,
    config: MonitorConfig,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Monitor {
    pub fn new(engine: Arc<GeofenceEngine>, config: MonitorConfig) -> Self {
        Self {
            engine,
            config,
            task: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Start the loop. Returns `false` if it was already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) -> bool {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return false;
        }

        let engine = self.engine.clone();
        let period = self.config.interval;
        *task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let report = engine.evaluate().await;
                debug!(
                    created = report.created(),
                    skipped = report.skipped,
                    "Monitor pass"
                );
            }
        }));

        info!(interval_secs = period.as_secs_f64(), "Geofence monitor started");
        true
    }

    /// Stop the loop. Returns `false` if it was not running.
    pub fn stop(&self) -> bool {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        match task.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                info!("Geofence monitor stopped");
                true
            }
            _ => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|t| !t.is_finished())
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        if let Some(handle) = self
            .task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}
