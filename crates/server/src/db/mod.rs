//! Database access for the Pufff backing store.
//!
//! # Tables
//!
//! - `lockers` - Parcel locker directory (keyed by `locker_code`)
//! - `profiles` - Per-user profile rows with a `role` column
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p pufff-cli -- migrate
//! ```
//!
//! All queries use the sqlx runtime API so the workspace builds without a
//! live database.

pub mod lockers;
pub mod profiles;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use pufff_core::{LockerRecord, UserId};

pub use lockers::PgLockerStore;
pub use profiles::PgProfileStore;

/// Errors surfaced by the backing store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database query or connection failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The backing store could not be reached or rejected the call.
    #[error("backing store unavailable: {0}")]
    Unavailable(String),
}

/// Backing store for the locker directory.
///
/// The directory and the bulk importer only see this seam, so tests inject
/// in-memory stores and production wires up [`PgLockerStore`].
#[async_trait]
pub trait LockerStore: Send + Sync {
    /// Fetch every raw locker row.
    async fn fetch_all(&self) -> Result<Vec<LockerRecord>, StoreError>;

    /// Upsert a batch of records keyed by `locker_code`.
    ///
    /// Returns the number of rows written.
    async fn upsert_batch(&self, records: &[LockerRecord]) -> Result<u64, StoreError>;

    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Lookup of per-user profile rows.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// The `role` column of the user's profile, if the profile exists.
    async fn role_for(&self, user_id: UserId) -> Result<Option<String>, StoreError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
