//! Web layer for the geofence server.
//!
//! JSON endpoints for querying stations, trains, objects and alerts,
//! reporting positions, and driving the simulator.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
