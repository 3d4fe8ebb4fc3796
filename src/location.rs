//! Coordinates, great-circle distance and the current-location slot.
//!
//! Locations travel as `"lat, lon"` text in decimal degrees. User input is
//! validated against [`COORDINATES_PATTERN`]; stored values are parsed
//! leniently because they were validated on the way in.

use crate::error::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Mean Earth radius in meters.
const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Accepted form of a user-entered location: latitude in [-90, 90] and
/// longitude in [-180, 180], separated by a comma and optional whitespace.
pub const COORDINATES_PATTERN: &str = r"^[-+]?([1-8]?\d(\.\d+)?|90(\.0+)?),\s*[-+]?(180(\.0+)?|((1[0-7]\d)|([1-9]?\d))(\.\d+)?)$";

static COORDINATES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(COORDINATES_PATTERN).unwrap());

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
}

impl Coordinates {
    /// Create a coordinate pair without validation.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Parse user input, enforcing the decimal-degree pattern.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCoordinates`] if the text does not
    /// match [`COORDINATES_PATTERN`].
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        if !COORDINATES_RE.is_match(text) {
            return Err(ValidationError::InvalidCoordinates(text.to_string()));
        }
        Self::parse_stored(text)
            .ok_or_else(|| ValidationError::InvalidCoordinates(text.to_string()))
    }

    /// Parse a persisted `"lat, lon"` value. Empty or malformed text yields `None`.
    #[must_use]
    pub fn parse_stored(text: &str) -> Option<Self> {
        let (lat, lon) = text.split_once(',')?;
        let latitude = lat.trim().parse().ok()?;
        let longitude = lon.trim().parse().ok()?;
        Some(Self { latitude, longitude })
    }

    /// Great-circle distance to `other` in meters (haversine).
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_METERS * a.sqrt().atan2((1.0 - a).sqrt())
    }

    /// URI that opens this point in a map application.
    #[must_use]
    pub fn map_uri(&self) -> String {
        format!("geo:{},{}", self.latitude, self.longitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// Serialize an optional location to its stored form (`""` when absent).
#[must_use]
pub fn location_to_wire(location: Option<&Coordinates>) -> String {
    location.map(ToString::to_string).unwrap_or_default()
}

/// Holds the most recent location fix.
///
/// Clones share the same slot, so the platform feed and the reminder loop can
/// each hold a handle. Updates overwrite; no history is kept.
#[derive(Debug, Clone, Default)]
pub struct LocationTracker {
    slot: Arc<RwLock<Option<Coordinates>>>,
}

impl LocationTracker {
    /// Create a tracker with no fix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current fix.
    pub fn update(&self, fix: Coordinates) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(fix);
        tracing::debug!(latitude = fix.latitude, longitude = fix.longitude, "location updated");
    }

    /// The latest fix, if one has been received.
    #[must_use]
    pub fn current(&self) -> Option<Coordinates> {
        *self.slot.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Forget the current fix (e.g. location access was revoked).
    pub fn clear(&self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
