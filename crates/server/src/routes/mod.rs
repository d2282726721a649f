//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (backing store ping)
//!
//! # Lockers
//! GET  /api/lockers                 - Full directory, or ranked by ?lat=&lng=
//!
//! # Admin
//! POST /api/admin/session           - Verify bearer token, issue hint cookie
//! POST /api/admin/lockers/refresh   - Force a directory reload (requires admin)
//! GET  /admin/status                - Cache status page (cookie-gated UI)
//! ```

pub mod admin;
pub mod lockers;

use axum::extract::State;
use axum::http::header::InvalidHeaderValue;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Build the application router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/api/lockers", get(lockers::list))
        .route("/api/admin/session", post(admin::session))
        .route("/api/admin/lockers/refresh", post(admin::refresh_lockers))
        .route("/admin/status", get(admin::status))
        .with_state(state)
}

/// CORS layer restricted to the storefront frontend origin.
///
/// Credentials are allowed because the session endpoint sets the hint
/// cookie, which rules out a wildcard origin.
///
/// # Errors
///
/// Returns an error if `base_url` is not a valid header value.
pub fn cors_layer(base_url: &str) -> Result<CorsLayer, InvalidHeaderValue> {
    let origin = base_url.trim_end_matches('/').parse::<HeaderValue>()?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies backing-store connectivity before returning OK.
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.directory().ping().await {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
