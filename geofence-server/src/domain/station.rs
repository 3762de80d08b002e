//! Stations: fixed reference points.

use std::fmt;

use crate::geo::Position;

use super::error::DomainError;
use super::ident::{self, InvalidIdentifier};

/// A station code such as `NDLS` or `PUNE`.
///
/// Codes are upper-case by construction, so lookups never need to care
/// about case.
///
/// # Examples
///
/// ```
/// use geofence_server::domain::StationCode;
///
/// let ndls = StationCode::parse("NDLS").unwrap();
/// assert_eq!(ndls.as_str(), "NDLS");
///
/// // Lowercase is rejected by parse but accepted by parse_normalized
/// assert!(StationCode::parse("ndls").is_err());
/// assert_eq!(StationCode::parse_normalized(" ndls ").unwrap(), ndls);
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationCode(String);

impl StationCode {
    /// Parse a station code. Must be upper-case ASCII letters or digits.
    pub fn parse(s: &str) -> Result<Self, InvalidIdentifier> {
        ident::check("station code", s)?;
        if s.bytes().any(|b| b.is_ascii_lowercase()) {
            return Err(InvalidIdentifier::new("station code", "must be upper-case"));
        }
        Ok(StationCode(s.to_string()))
    }

    /// Parse after trimming whitespace and upper-casing.
    pub fn parse_normalized(s: &str) -> Result<Self, InvalidIdentifier> {
        Self::parse(&s.trim().to_ascii_uppercase())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationCode({})", self.0)
    }
}

impl fmt::Display for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A station. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    code: StationCode,
    name: String,
    position: Position,
}

impl Station {
    /// Create a station, rejecting positions outside the valid range.
    pub fn new(code: StationCode, name: impl Into<String>, position: Position) -> Result<Self, DomainError> {
        if !position.is_valid() {
            return Err(DomainError::InvalidPosition {
                entity: format!("station {code}"),
                position,
            });
        }
        Ok(Self {
            code,
            name: name.into(),
            position,
        })
    }

    pub fn code(&self) -> &StationCode {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Position {
        self.position
    }
}
