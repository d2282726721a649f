//! Identity provider client.
//!
//! Delegates bearer-token verification to the hosted identity provider.
//! Any provider error collapses into `AuthError::InvalidSession`; identity
//! resolution never fails open.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use pufff_core::{Email, UserId};

use crate::config::AuthConfig;

use super::AuthError;

/// How long to wait for the identity provider before failing closed.
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// An authenticated identity resolved from a bearer token.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: UserId,
    pub email: Email,
}

/// Token verification seam; production uses [`HttpIdentityProvider`],
/// tests inject stubs.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a bearer token to an identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidSession` for any provider failure.
    async fn resolve(&self, token: &str) -> Result<Identity, AuthError>;
}

/// Client for the hosted identity provider's user-info endpoint.
///
/// Authenticates itself with the service key in the `apikey` header; the
/// end user's bearer token rides alongside and names the session being
/// resolved.
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    user_endpoint: String,
    service_key: SecretString,
}

/// Provider response body (extra fields ignored).
#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: UserId,
    email: Option<String>,
}

impl HttpIdentityProvider {
    /// Create a provider client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be built.
    pub fn new(config: &AuthConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(PROVIDER_TIMEOUT)
            .build()?;

        let user_endpoint = format!(
            "{}/auth/v1/user",
            config.base_url.as_str().trim_end_matches('/')
        );

        Ok(Self {
            client,
            user_endpoint,
            service_key: config.service_key.clone(),
        })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    #[instrument(skip(self, token))]
    async fn resolve(&self, token: &str) -> Result<Identity, AuthError> {
        let response = self
            .client
            .get(&self.user_endpoint)
            .header("apikey", self.service_key.expose_secret())
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "identity provider request failed");
                AuthError::InvalidSession
            })?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "identity provider rejected token");
            return Err(AuthError::InvalidSession);
        }

        let user: ProviderUser = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "identity provider returned malformed body");
            AuthError::InvalidSession
        })?;

        let email = user
            .email
            .as_deref()
            .and_then(|e| Email::parse(e).ok())
            .ok_or(AuthError::InvalidSession)?;

        Ok(Identity {
            user_id: user.id,
            email,
        })
    }
}
