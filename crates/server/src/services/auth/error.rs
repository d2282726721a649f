//! Admin session gate errors.

use thiserror::Error;

/// Errors produced while verifying or authorizing a bearer credential.
///
/// Denials deliberately carry no detail about *why* authorization failed;
/// an invalid token and an email missing from the allow-list must be
/// indistinguishable to the caller.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No `Authorization: Bearer <token>` header, or a malformed one.
    #[error("missing token")]
    MissingToken,

    /// The identity provider rejected the token, returned no identity, or
    /// could not be reached (fail-closed).
    #[error("invalid session")]
    InvalidSession,

    /// A valid identity without admin privilege attempted a privileged
    /// operation.
    #[error("invalid session")]
    Denied,
}
