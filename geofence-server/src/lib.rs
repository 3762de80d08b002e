//! Rail geofence server.
//!
//! Tracks trains, their coaches and the objects carried on them against
//! fixed stations, and raises alerts when a train approaches a station or
//! an object strays from its coach. A simulator drives synthetic movement
//! so the alerting can be exercised without real telemetry.

pub mod alerts;
pub mod config;
pub mod domain;
pub mod engine;
pub mod evaluator;
pub mod geo;
pub mod monitor;
pub mod registry;
pub mod seed;
pub mod simulation;
pub mod web;

#[cfg(test)]
mod testing;
