//! Great-circle computations on a spherical Earth.

use super::Position;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometers (haversine).
///
/// Symmetric, and zero iff the points coincide.
///
/// # Examples
///
/// ```
/// use geofence_server::geo::{Position, distance_km};
///
/// let delhi = Position::new(28.6425, 77.2207);
/// let mumbai = Position::new(18.9712, 72.8213);
/// let d = distance_km(delhi, mumbai);
/// assert!((1100.0..1200.0).contains(&d));
/// ```
pub fn distance_km(a: Position, b: Position) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = lat_b - lat_a;
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1 for antipodal points.
    let c = 2.0 * h.min(1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Initial bearing (forward azimuth) from `from` to `to`, in [0, 360).
///
/// 0 is true north, 90 is east.
pub fn bearing_deg(from: Position, to: Position) -> f64 {
    let lat_a = from.lat.to_radians();
    let lat_b = to.lat.to_radians();
    let d_lon = (to.lon - from.lon).to_radians();

    let y = d_lon.sin() * lat_b.cos();
    let x = lat_a.cos() * lat_b.sin() - lat_a.sin() * lat_b.cos() * d_lon.cos();

    normalize_bearing(y.atan2(x).to_degrees())
}

/// Project the point reached by travelling `distance_km` from `start` along
/// the great circle with initial bearing `bearing_deg`.
///
/// The resulting longitude is normalized into [-180, 180).
pub fn destination_point(start: Position, bearing_deg: f64, distance_km: f64) -> Position {
    let lat = start.lat.to_radians();
    let lon = start.lon.to_radians();
    let theta = bearing_deg.to_radians();
    let delta = distance_km / EARTH_RADIUS_KM;

    let lat2 = (lat.sin() * delta.cos() + lat.cos() * delta.sin() * theta.cos()).asin();
    let lon2 = lon
        + (theta.sin() * delta.sin() * lat.cos()).atan2(delta.cos() - lat.sin() * lat2.sin());

    Position::new(lat2.to_degrees(), normalize_longitude(lon2.to_degrees()))
}

/// Whether `point` lies inside the circle of `radius_km` around `center`.
///
/// The boundary is inclusive.
pub fn is_within_fence(point: Position, center: Position, radius_km: f64) -> bool {
    distance_km(point, center) <= radius_km
}

/// Normalize an angle in degrees into [0, 360).
pub(crate) fn normalize_bearing(deg: f64) -> f64 {
    let b = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if b >= 360.0 { 0.0 } else { b }
}

fn normalize_longitude(deg: f64) -> f64 {
    let lon = (deg + 180.0).rem_euclid(360.0) - 180.0;
    if lon >= 180.0 { -180.0 } else { lon }
}
