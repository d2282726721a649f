//! Postgres-backed locker store.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use pufff_core::LockerRecord;

use super::{LockerStore, StoreError};

/// Locker store backed by the `lockers` table.
#[derive(Clone)]
pub struct PgLockerStore {
    pool: PgPool,
}

/// Raw row shape of the `lockers` table.
#[derive(Debug, sqlx::FromRow)]
struct LockerRow {
    locker_code: Option<String>,
    name: Option<String>,
    address: Option<String>,
    city: Option<String>,
    province: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl From<LockerRow> for LockerRecord {
    fn from(row: LockerRow) -> Self {
        Self {
            locker_code: row.locker_code,
            name: row.name,
            address: row.address,
            city: row.city,
            province: row.province,
            latitude: row.latitude,
            longitude: row.longitude,
        }
    }
}

impl PgLockerStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LockerStore for PgLockerStore {
    async fn fetch_all(&self) -> Result<Vec<LockerRecord>, StoreError> {
        let rows = sqlx::query_as::<_, LockerRow>(
            "SELECT locker_code, name, address, city, province, latitude, longitude \
             FROM lockers",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(LockerRecord::from).collect())
    }

    async fn upsert_batch(&self, records: &[LockerRecord]) -> Result<u64, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "INSERT INTO lockers (locker_code, name, address, city, province, latitude, longitude) ",
        );
        builder.push_values(records, |mut b, record| {
            b.push_bind(record.locker_code.as_deref())
                .push_bind(record.name.as_deref())
                .push_bind(record.address.as_deref())
                .push_bind(record.city.as_deref())
                .push_bind(record.province.as_deref())
                .push_bind(record.latitude)
                .push_bind(record.longitude);
        });
        builder.push(
            " ON CONFLICT (locker_code) DO UPDATE SET \
             name = EXCLUDED.name, \
             address = EXCLUDED.address, \
             city = EXCLUDED.city, \
             province = EXCLUDED.province, \
             latitude = EXCLUDED.latitude, \
             longitude = EXCLUDED.longitude, \
             updated_at = now()",
        );

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
