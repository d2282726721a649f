//! Admin authentication extractors.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
    response::Redirect,
};

use crate::error::AppError;
use crate::services::auth::{AdminVerdict, AuthError, read_admin_hint};
use crate::state::AppState;

/// Extract the bearer token from an `Authorization` header.
///
/// # Errors
///
/// Returns `AuthError::MissingToken` when the header is absent, is not a
/// `Bearer` scheme, or carries an empty token.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(AuthError::MissingToken)?;

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

/// Extractor that requires a verified admin.
///
/// This is the authoritative gate: it resolves the bearer token against the
/// identity provider and re-runs authorization on every request. The hint
/// cookie is never consulted.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdmin(admin): RequireAdmin,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.email)
/// }
/// ```
pub struct RequireAdmin(pub AdminVerdict);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let verdict = state.gate().require_admin(token).await?;
        Ok(Self(verdict))
    }
}

/// Extractor that reads only the `pufff_is_admin` hint cookie.
///
/// Fast path for UI routes: avoids a network round trip before rendering.
/// Explicitly non-authoritative; anything privileged behind it must also go
/// through [`RequireAdmin`].
pub struct AdminHint;

impl<S> FromRequestParts<S> for AdminHint
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let hinted = parts
            .headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(read_admin_hint);

        if hinted {
            Ok(Self)
        } else {
            Err(Redirect::to("/login"))
        }
    }
}
