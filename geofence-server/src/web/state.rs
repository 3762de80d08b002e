//! Application state for the web layer.

use std::sync::Arc;

use crate::engine::GeofenceEngine;
use crate::monitor::{Monitor, MonitorConfig};

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Live geofence state
    pub engine: Arc<GeofenceEngine>,

    /// Periodic evaluation loop
    pub monitor: Arc<Monitor>,
}

impl AppState {
    /// Create a new app state. The monitor is created stopped.
    pub fn new(engine: GeofenceEngine, monitor_config: MonitorConfig) -> Self {
        let engine = Arc::new(engine);
        let monitor = Arc::new(Monitor::new(engine.clone(), monitor_config));
        Self { engine, monitor }
    }
}
