//! Admin session and administrative locker endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::{AdminHint, RequireAdmin, bearer_token};
use crate::services::auth::{AuthError, admin_cookie};
use crate::state::AppState;

/// Response body of the session endpoint.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub ok: bool,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

/// Verify the bearer token and issue the hint cookie.
///
/// The cookie is always set: `true` with a 30-day lifetime when the
/// identity is authorized, `false` with immediate expiry otherwise, so a
/// previously-authorized browser loses its stale hint on the next call.
#[instrument(skip(state, headers))]
pub async fn session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = match bearer_token(&headers) {
        Ok(token) => token,
        Err(e) => return denial(&e),
    };

    match state.gate().verify(token).await {
        Ok(verdict) => {
            tracing::debug!(email = %verdict.email, is_admin = verdict.is_admin, "session verdict");
            (
                StatusCode::OK,
                [(header::SET_COOKIE, admin_cookie(verdict.is_admin))],
                Json(SessionResponse {
                    ok: true,
                    is_admin: verdict.is_admin,
                }),
            )
                .into_response()
        }
        Err(e) => denial(&e),
    }
}

/// 401 with the cookie forced to an expiring `false`.
fn denial(err: &AuthError) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::SET_COOKIE, admin_cookie(false))],
        Json(json!({ "ok": false, "error": err.to_string() })),
    )
        .into_response()
}

/// Force a directory reload from the backing store.
///
/// Administrative write path: unlike the public locker listing, a store
/// failure here propagates as an explicit error.
#[instrument(skip(state, admin), fields(admin = %admin.0.email))]
pub async fn refresh_lockers(
    admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let lockers = state.directory().get_lockers(true).await?;
    tracing::info!(count = lockers.len(), "locker directory refreshed");
    Ok(Json(json!({ "ok": true, "count": lockers.len() })))
}

/// Cache status page behind the cookie fast path.
///
/// `AdminHint` only decides whether to show this UI; nothing privileged is
/// exposed, and the admin APIs it links to re-verify the bearer token.
pub async fn status(_hint: AdminHint, State(state): State<AppState>) -> Json<serde_json::Value> {
    let directory = state.directory();
    Json(json!({
        "lockers": directory.cached_len().await,
        "cacheAgeSecs": directory.cache_age().await.map(|age| age.as_secs()),
    }))
}
