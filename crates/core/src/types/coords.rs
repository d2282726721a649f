//! Geographic coordinates and great-circle distance.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers, used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Errors constructing [`Coordinates`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateError {
    /// Latitude is NaN or infinite.
    #[error("latitude must be a finite number")]
    NonFiniteLatitude,
    /// Longitude is NaN or infinite.
    #[error("longitude must be a finite number")]
    NonFiniteLongitude,
}

/// A validated latitude/longitude pair in decimal degrees.
///
/// Construction rejects non-finite values, so distance computations over
/// `Coordinates` can never produce NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    lat: f64,
    lng: f64,
}

impl Coordinates {
    /// Create coordinates from decimal degrees.
    ///
    /// # Errors
    ///
    /// Returns `CoordinateError` if either value is NaN or infinite.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() {
            return Err(CoordinateError::NonFiniteLatitude);
        }
        if !lng.is_finite() {
            return Err(CoordinateError::NonFiniteLongitude);
        }
        Ok(Self { lat, lng })
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.lng
    }

    /// Great-circle distance to `other` in kilometers.
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        haversine_km(self.lat, self.lng, other.lat, other.lng)
    }
}

/// Haversine distance between two points in decimal degrees, in kilometers.
///
/// Uses the mean Earth radius ([`EARTH_RADIUS_KM`]). Inputs are expected to
/// be finite; callers validate via [`Coordinates`] or locker admissibility.
#[must_use]
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}
