//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::db::{PgLockerStore, PgProfileStore};
use crate::directory::LockerDirectory;
use crate::services::auth::{AdminGate, HttpIdentityProvider, RoleLookup, StaticAllowList};

/// Error creating application state.
#[derive(Debug, thiserror::Error)]
pub enum StateInitError {
    #[error("failed to build identity provider client: {0}")]
    IdentityClient(#[from] reqwest::Error),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds the locker directory (the only
/// shared mutable state in the process) and the admin gate.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    directory: LockerDirectory,
    gate: AdminGate,
}

impl AppState {
    /// Wire up application state from configuration and a database pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the identity provider client cannot be built.
    pub fn new(config: &ServerConfig, pool: PgPool) -> Result<Self, StateInitError> {
        let provider = HttpIdentityProvider::new(&config.auth)?;
        let allow_list = StaticAllowList::new(config.admin_emails.clone());
        let role_lookup = RoleLookup::new(Arc::new(PgProfileStore::new(pool.clone())));

        let gate = AdminGate::new(
            Arc::new(provider),
            vec![Arc::new(allow_list), Arc::new(role_lookup)],
        );
        let directory = LockerDirectory::new(Arc::new(PgLockerStore::new(pool)));

        Ok(Self::from_parts(directory, gate))
    }

    /// Assemble state from already-built parts (tests inject stubs here).
    #[must_use]
    pub fn from_parts(directory: LockerDirectory, gate: AdminGate) -> Self {
        Self {
            inner: Arc::new(AppStateInner { directory, gate }),
        }
    }

    /// Get a reference to the locker directory.
    #[must_use]
    pub fn directory(&self) -> &LockerDirectory {
        &self.inner.directory
    }

    /// Get a reference to the admin session gate.
    #[must_use]
    pub fn gate(&self) -> &AdminGate {
        &self.inner.gate
    }
}
