//! Parcel locker records: raw rows and the normalized public shape.

use serde::{Deserialize, Serialize};

use super::coords::haversine_km;

/// Placeholder used when a locker row has no name.
pub const UNNAMED_LOCKER: &str = "Unnamed locker";

/// Placeholder used when a locker row has no address.
pub const NO_ADDRESS: &str = "Address not available";

/// A raw locker row as stored in the backing store or read from an import
/// feed. Every field is optional; admissibility is decided at
/// normalization time by [`Locker::from_record`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LockerRecord {
    pub locker_code: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// A normalized locker, safe to serve to clients.
///
/// `distance_km` is attached only on the ranked-query path and is never
/// persisted; it serializes as `distanceKm` and is omitted when absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Locker {
    pub code: String,
    pub name: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "distanceKm", skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl Locker {
    /// Normalize a raw row.
    ///
    /// A record is admissible only if its `locker_code` is non-empty and
    /// both coordinates are present and finite. Inadmissible records return
    /// `None` and are dropped, never surfaced.
    #[must_use]
    pub fn from_record(record: LockerRecord) -> Option<Self> {
        let code = record
            .locker_code
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty())?;
        let lat = record.latitude.filter(|v| v.is_finite())?;
        let lng = record.longitude.filter(|v| v.is_finite())?;

        Some(Self {
            code,
            name: non_empty(record.name).unwrap_or_else(|| UNNAMED_LOCKER.to_owned()),
            address: non_empty(record.address).unwrap_or_else(|| NO_ADDRESS.to_owned()),
            city: non_empty(record.city),
            province: non_empty(record.province),
            lat,
            lng,
            distance_km: None,
        })
    }

    /// Distance in kilometers from a query point to this locker.
    #[must_use]
    pub fn distance_from(&self, lat: f64, lng: f64) -> f64 {
        haversine_km(lat, lng, self.lat, self.lng)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
