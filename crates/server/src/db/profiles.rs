//! Postgres-backed profile lookup.

use async_trait::async_trait;
use sqlx::PgPool;

use pufff_core::UserId;

use super::{ProfileStore, StoreError};

/// Profile store backed by the `profiles` table.
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn role_for(&self, user_id: UserId) -> Result<Option<String>, StoreError> {
        let role = sqlx::query_scalar::<_, Option<String>>(
            "SELECT role FROM profiles WHERE id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(role.flatten())
    }
}
