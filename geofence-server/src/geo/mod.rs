//! Spherical-earth geodesy.
//!
//! Distances, bearings and projections over a sphere of mean Earth radius.
//! Sub-meter accuracy is not a goal: trains are alerted on at kilometer
//! scale and objects at tens of meters.

mod geodesy;
mod position;

pub use geodesy::{EARTH_RADIUS_KM, bearing_deg, destination_point, distance_km, is_within_fence};
pub use position::{GeoPoint, PointKind, Position};

pub(crate) use geodesy::normalize_bearing;
