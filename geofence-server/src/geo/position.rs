//! Geographic position type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A point on the Earth's surface, in degrees.
///
/// Serialized as a `[longitude, latitude]` pair, the GeoJSON coordinate
/// order used by map clients.
///
/// # Examples
///
/// ```
/// use geofence_server::geo::Position;
///
/// let ndls = Position::new(28.6425, 77.2207);
/// let json = serde_json::to_string(&ndls).unwrap();
/// assert_eq!(json, "[77.2207,28.6425]");
/// ```
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Position {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lon: f64,
}

impl Position {
    /// Create a position from latitude and longitude (degrees).
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Create a position from a `[longitude, latitude]` pair.
    pub const fn from_lon_lat(lon: f64, lat: f64) -> Self {
        Self { lat, lon }
    }

    /// Returns the `[longitude, latitude]` pair.
    pub const fn lon_lat(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    /// Whether both coordinates are finite and the latitude is in [-90, 90].
    ///
    /// Longitude is not range-checked: the trigonometry wraps it implicitly.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite() && (-90.0..=90.0).contains(&self.lat)
    }
}

impl From<[f64; 2]> for Position {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self::from_lon_lat(lon, lat)
    }
}

impl From<Position> for [f64; 2] {
    fn from(p: Position) -> Self {
        p.lon_lat()
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({:.6}, {:.6})", self.lat, self.lon)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lon)
    }
}

/// The GeoJSON geometry type of a [`GeoPoint`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointKind {
    #[default]
    Point,
}

/// A GeoJSON `Point` geometry: `{"type": "Point", "coordinates": [lon, lat]}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type", default)]
    pub kind: PointKind,
    pub coordinates: Position,
}

impl From<Position> for GeoPoint {
    fn from(coordinates: Position) -> Self {
        Self {
            kind: PointKind::Point,
            coordinates,
        }
    }
}
