//! Authorization sources.
//!
//! The system has two independent ways of granting admin privilege: a
//! configured email allow-list and a `role` column on the user's profile
//! row. Either one is sufficient; the gate asks each source in turn.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;

use pufff_core::ProfileRole;

use crate::db::{ProfileStore, StoreError};

use super::Identity;

/// A single way of deciding whether an identity holds admin privilege.
#[async_trait]
pub trait AuthorizationSource: Send + Sync {
    /// Whether this source grants admin privilege to `identity`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the source could not be consulted; the gate
    /// treats that as "not approved" (fail-closed) rather than an outage.
    async fn authorizes(&self, identity: &Identity) -> Result<bool, StoreError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Allow-list of lowercased admin emails from configuration.
///
/// Read-only process-wide state; loaded once and never mutated at runtime.
pub struct StaticAllowList {
    emails: BTreeSet<String>,
}

impl StaticAllowList {
    /// Wrap an already-folded allow-list (see `config::parse_allow_list`).
    #[must_use]
    pub const fn new(emails: BTreeSet<String>) -> Self {
        Self { emails }
    }
}

#[async_trait]
impl AuthorizationSource for StaticAllowList {
    async fn authorizes(&self, identity: &Identity) -> Result<bool, StoreError> {
        Ok(self.emails.contains(&identity.email.folded()))
    }

    fn name(&self) -> &'static str {
        "allow_list"
    }
}

/// Grants privilege when the profile `role` column equals the admin
/// sentinel.
pub struct RoleLookup {
    profiles: Arc<dyn ProfileStore>,
}

impl RoleLookup {
    #[must_use]
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        Self { profiles }
    }
}

#[async_trait]
impl AuthorizationSource for RoleLookup {
    async fn authorizes(&self, identity: &Identity) -> Result<bool, StoreError> {
        let role = self.profiles.role_for(identity.user_id).await?;
        Ok(role
            .as_deref()
            .and_then(|r| r.parse::<ProfileRole>().ok())
            .is_some_and(ProfileRole::is_admin))
    }

    fn name(&self) -> &'static str {
        "role_lookup"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pufff_core::{Email, UserId};

    use super::*;

    fn identity(email: &str) -> Identity {
        Identity {
            user_id: UserId::random(),
            email: Email::parse(email).unwrap(),
        }
    }

    struct FixedRole(Option<&'static str>);

    #[async_trait]
    impl ProfileStore for FixedRole {
        async fn role_for(&self, _user_id: UserId) -> Result<Option<String>, StoreError> {
            Ok(self.0.map(str::to_owned))
        }
    }

    #[tokio::test]
    async fn test_allow_list_is_case_insensitive() {
        let list = StaticAllowList::new(
            ["admin@example.com".to_owned()].into_iter().collect(),
        );

        assert!(list.authorizes(&identity("Admin@Example.COM")).await.unwrap());
        assert!(!list.authorizes(&identity("other@example.com")).await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_allow_list_approves_nobody() {
        let list = StaticAllowList::new(BTreeSet::new());
        assert!(!list.authorizes(&identity("admin@example.com")).await.unwrap());
    }

    #[tokio::test]
    async fn test_role_lookup_matches_admin_sentinel() {
        let admin = RoleLookup::new(Arc::new(FixedRole(Some("admin"))));
        assert!(admin.authorizes(&identity("a@b.com")).await.unwrap());

        let customer = RoleLookup::new(Arc::new(FixedRole(Some("customer"))));
        assert!(!customer.authorizes(&identity("a@b.com")).await.unwrap());

        let missing = RoleLookup::new(Arc::new(FixedRole(None)));
        assert!(!missing.authorizes(&identity("a@b.com")).await.unwrap());
    }
}
