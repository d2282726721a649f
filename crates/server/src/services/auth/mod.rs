//! Admin session gate.
//!
//! Per-request flow: a bearer credential is presented, resolved to an
//! identity by the provider, and cross-checked against the configured
//! authorization sources. Identity-provider outages surface as denial,
//! never as fail-open.

mod cookie;
mod error;
mod provider;
mod sources;

pub use cookie::{ADMIN_COOKIE_NAME, admin_cookie, read_admin_hint};
pub use error::AuthError;
pub use provider::{HttpIdentityProvider, Identity, IdentityProvider};
pub use sources::{AuthorizationSource, RoleLookup, StaticAllowList};

use std::sync::Arc;

use pufff_core::{Email, UserId};

/// Result of verifying a bearer credential: the resolved identity plus the
/// authorization verdict. Ephemeral, computed per request, never persisted
/// beyond the hint cookie.
#[derive(Debug, Clone)]
pub struct AdminVerdict {
    pub user_id: UserId,
    pub email: Email,
    pub is_admin: bool,
}

/// Verifies bearer tokens and decides admin privilege.
pub struct AdminGate {
    provider: Arc<dyn IdentityProvider>,
    sources: Vec<Arc<dyn AuthorizationSource>>,
}

impl AdminGate {
    /// Build a gate from an identity provider and authorization sources.
    #[must_use]
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        sources: Vec<Arc<dyn AuthorizationSource>>,
    ) -> Self {
        Self { provider, sources }
    }

    /// Resolve a token and compute the authorization verdict.
    ///
    /// Any single approving source is sufficient. A source that fails to
    /// answer is logged and counts as not-approved.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidSession` when the token cannot be
    /// resolved to an identity.
    pub async fn verify(&self, token: &str) -> Result<AdminVerdict, AuthError> {
        let identity = self.provider.resolve(token).await?;

        let mut is_admin = false;
        for source in &self.sources {
            match source.authorizes(&identity).await {
                Ok(true) => {
                    is_admin = true;
                    break;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(
                        source = source.name(),
                        error = %e,
                        "authorization source failed; treating as not approved"
                    );
                }
            }
        }

        Ok(AdminVerdict {
            user_id: identity.user_id,
            email: identity.email,
            is_admin,
        })
    }

    /// Privilege re-check for state-changing admin operations.
    ///
    /// Every privileged call goes through here with the bearer token; the
    /// hint cookie is never an input.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Denied` for a valid identity without privilege,
    /// or `AuthError::InvalidSession` for an unresolvable token.
    pub async fn require_admin(&self, token: &str) -> Result<AdminVerdict, AuthError> {
        let verdict = self.verify(token).await?;
        if !verdict.is_admin {
            return Err(AuthError::Denied);
        }
        Ok(verdict)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct StubProvider(Option<Identity>);

    #[async_trait]
    impl IdentityProvider for StubProvider {
        async fn resolve(&self, _token: &str) -> Result<Identity, AuthError> {
            self.0.clone().ok_or(AuthError::InvalidSession)
        }
    }

    fn identity(email: &str) -> Identity {
        Identity {
            user_id: UserId::random(),
            email: Email::parse(email).unwrap(),
        }
    }

    fn allow_list(emails: &[&str]) -> Arc<dyn AuthorizationSource> {
        Arc::new(StaticAllowList::new(
            emails.iter().map(|e| (*e).to_owned()).collect(),
        ))
    }

    #[tokio::test]
    async fn test_allow_listed_email_is_admin() {
        let gate = AdminGate::new(
            Arc::new(StubProvider(Some(identity("admin@example.com")))),
            vec![allow_list(&["admin@example.com"])],
        );

        let verdict = gate.verify("token").await.unwrap();
        assert!(verdict.is_admin);
        assert_eq!(verdict.email.as_str(), "admin@example.com");
    }

    #[tokio::test]
    async fn test_unknown_email_is_not_admin() {
        let gate = AdminGate::new(
            Arc::new(StubProvider(Some(identity("guest@example.com")))),
            vec![allow_list(&["admin@example.com"])],
        );

        let verdict = gate.verify("token").await.unwrap();
        assert!(!verdict.is_admin);
    }

    #[tokio::test]
    async fn test_provider_failure_is_invalid_session() {
        let gate = AdminGate::new(
            Arc::new(StubProvider(None)),
            vec![allow_list(&["admin@example.com"])],
        );

        assert!(matches!(
            gate.verify("token").await.unwrap_err(),
            AuthError::InvalidSession
        ));
    }

    #[tokio::test]
    async fn test_any_source_is_sufficient() {
        struct Approve;
        #[async_trait]
        impl AuthorizationSource for Approve {
            async fn authorizes(
                &self,
                _identity: &Identity,
            ) -> Result<bool, crate::db::StoreError> {
                Ok(true)
            }
            fn name(&self) -> &'static str {
                "approve"
            }
        }

        let gate = AdminGate::new(
            Arc::new(StubProvider(Some(identity("guest@example.com")))),
            vec![allow_list(&[]), Arc::new(Approve)],
        );

        assert!(gate.verify("token").await.unwrap().is_admin);
    }

    #[tokio::test]
    async fn test_failing_source_counts_as_not_approved() {
        struct Broken;
        #[async_trait]
        impl AuthorizationSource for Broken {
            async fn authorizes(
                &self,
                _identity: &Identity,
            ) -> Result<bool, crate::db::StoreError> {
                Err(crate::db::StoreError::Unavailable("down".to_owned()))
            }
            fn name(&self) -> &'static str {
                "broken"
            }
        }

        let gate = AdminGate::new(
            Arc::new(StubProvider(Some(identity("guest@example.com")))),
            vec![Arc::new(Broken)],
        );

        let verdict = gate.verify("token").await.unwrap();
        assert!(!verdict.is_admin);
    }

    #[tokio::test]
    async fn test_require_admin_denies_non_admin() {
        let gate = AdminGate::new(
            Arc::new(StubProvider(Some(identity("guest@example.com")))),
            vec![allow_list(&["admin@example.com"])],
        );

        assert!(matches!(
            gate.require_admin("token").await.unwrap_err(),
            AuthError::Denied
        ));
    }
}
