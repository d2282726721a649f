//! Locker query endpoint.
//!
//! Best-effort read path: backing-store failures are logged and surfaced to
//! the client as an empty array with a success status, never as an error
//! page. The administrative refresh endpoint (`routes::admin`) is the place
//! where store failures propagate explicitly.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use pufff_core::{Coordinates, Locker};

use crate::directory::DEFAULT_NEAR_LIMIT;
use crate::state::AppState;

/// Query parameters for the locker endpoint.
///
/// Coordinates arrive as raw strings so an unparseable value degrades to
/// the full listing instead of rejecting the whole request.
#[derive(Debug, Deserialize)]
pub struct LockerQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub all: Option<String>,
}

/// List lockers.
///
/// - `?all=true` returns the full normalized directory.
/// - `?lat=..&lng=..` (both parseable and finite) returns up to 50 entries
///   ranked by ascending `distanceKm`.
/// - Anything else falls back to the full directory.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<LockerQuery>,
) -> Json<Vec<Locker>> {
    if !wants_all(query.all.as_deref())
        && let Some(origin) = parse_origin(query.lat.as_deref(), query.lng.as_deref())
    {
        return match state.directory().query_near(origin, DEFAULT_NEAR_LIMIT).await {
            Ok(ranked) => Json(ranked),
            Err(e) => {
                tracing::error!(error = %e, "locker ranked query failed");
                Json(Vec::new())
            }
        };
    }

    match state.directory().query_all().await {
        Ok(lockers) => Json((*lockers).clone()),
        Err(e) => {
            tracing::error!(error = %e, "locker listing failed");
            Json(Vec::new())
        }
    }
}

fn wants_all(all: Option<&str>) -> bool {
    matches!(all, Some("true" | "1"))
}

/// Parse a query origin; `None` when either coordinate is absent,
/// unparseable, or non-finite.
fn parse_origin(lat: Option<&str>, lng: Option<&str>) -> Option<Coordinates> {
    let lat = lat?.trim().parse::<f64>().ok()?;
    let lng = lng?.trim().parse::<f64>().ok()?;
    Coordinates::new(lat, lng).ok()
}
