//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Route handlers that propagate errors return
//! `Result<T, AppError>`; the best-effort locker read path swallows store
//! errors instead (see `routes::lockers`).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::StoreError;
use crate::services::auth::AuthError;

/// Application-level error type for the server.
///
/// Only the failures the handlers actually produce: store errors from the
/// administrative refresh path and auth errors from the gate.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backing-store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Authentication or authorization failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Store(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
        };

        // Don't expose internal detail, and keep all authorization denials
        // indistinguishable from one another.
        let message = match &self {
            Self::Store(_) => "Internal server error".to_string(),
            Self::Auth(AuthError::MissingToken) => "missing token".to_string(),
            Self::Auth(_) => "invalid session".to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
