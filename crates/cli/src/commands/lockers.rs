//! Locker feed import command.
//!
//! Reads a JSON feed export (an array of objects with loosely-named
//! fields), maps each row onto a [`LockerRecord`], and upserts the result
//! into the directory table in fixed-size batches.
//!
//! Feeds smaller than [`MIN_IMPORT_ROWS`] rows are rejected outright: a
//! tiny export is far more likely a truncated download than a real
//! shrinking of the locker network, and importing it would clobber the
//! directory.

use std::path::Path;

use serde_json::Value;

use pufff_core::LockerRecord;
use pufff_server::db::{LockerStore, PgLockerStore, StoreError, create_pool};
use secrecy::SecretString;

/// Feeds with fewer raw rows than this are rejected as likely truncated.
pub const MIN_IMPORT_ROWS: usize = 500;

/// Rows per upsert statement.
pub const IMPORT_BATCH_SIZE: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Failed to read feed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse feed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Feed is not a JSON array of objects")]
    NotAnArray,

    #[error("Feed has only {0} rows (minimum {MIN_IMPORT_ROWS}); refusing likely-truncated import")]
    TooFewRows(usize),

    #[error("Batch {batch} failed: {source}")]
    Batch {
        batch: usize,
        source: StoreError,
    },

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Import a locker feed file into the configured database.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, holds fewer than
/// [`MIN_IMPORT_ROWS`] rows, or any upsert batch fails.
pub async fn import(path: &Path) -> Result<(), ImportError> {
    let raw = std::fs::read_to_string(path)?;
    let (records, skipped) = parse_feed(&raw)?;

    tracing::info!(
        mapped = records.len(),
        skipped,
        "Parsed locker feed {}",
        path.display()
    );

    dotenvy::dotenv().ok();
    let database_url = std::env::var("PUFFF_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| ImportError::MissingEnvVar("PUFFF_DATABASE_URL"))?;

    let pool = create_pool(&SecretString::from(database_url)).await?;
    let store = PgLockerStore::new(pool);

    let written = import_records(&store, &records).await?;
    tracing::info!(written, "Import complete");
    Ok(())
}

/// Parse a feed export into mapped records plus a skipped-row count.
///
/// The raw row count is checked against the floor before any mapping, so
/// a feed of 400 malformed rows is reported as too few rows rather than
/// as 400 skipped ones.
///
/// # Errors
///
/// Returns an error if the JSON is malformed, is not an array, or has
/// fewer than [`MIN_IMPORT_ROWS`] rows.
pub fn parse_feed(raw: &str) -> Result<(Vec<LockerRecord>, usize), ImportError> {
    let value: Value = serde_json::from_str(raw)?;
    let rows = value.as_array().ok_or(ImportError::NotAnArray)?;

    if rows.len() < MIN_IMPORT_ROWS {
        return Err(ImportError::TooFewRows(rows.len()));
    }

    let mut records = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;
    for row in rows {
        match map_row(row) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }
    Ok((records, skipped))
}

/// Map one feed row onto a record, resolving known field aliases.
///
/// Rows without a usable locker code are dropped; every other field is
/// best-effort.
fn map_row(row: &Value) -> Option<LockerRecord> {
    let obj = row.as_object()?;

    let code = string_field(obj, &["code", "lockerCode", "locker_code", "id"])?;

    Some(LockerRecord {
        locker_code: Some(code),
        name: string_field(obj, &["name", "lockerName"]),
        address: string_field(obj, &["address", "street"]),
        city: string_field(obj, &["city", "town"]),
        province: string_field(obj, &["province", "region", "state"]),
        latitude: number_field(obj, &["lat", "latitude", "geoLatitude"]),
        longitude: number_field(obj, &["lng", "lon", "longitude", "geoLongitude"]),
    })
}

fn string_field(obj: &serde_json::Map<String, Value>, aliases: &[&str]) -> Option<String> {
    for key in aliases {
        if let Some(value) = obj.get(*key) {
            let s = match value {
                Value::String(s) => s.trim().to_owned(),
                Value::Number(n) => n.to_string(),
                _ => continue,
            };
            if !s.is_empty() {
                return Some(s);
            }
        }
    }
    None
}

fn number_field(obj: &serde_json::Map<String, Value>, aliases: &[&str]) -> Option<f64> {
    for key in aliases {
        match obj.get(*key) {
            Some(Value::Number(n)) => return n.as_f64(),
            Some(Value::String(s)) => {
                if let Ok(parsed) = s.trim().parse::<f64>() {
                    return Some(parsed);
                }
            }
            _ => {}
        }
    }
    None
}

/// Upsert mapped records in fixed-size batches, returning the total
/// written.
///
/// # Errors
///
/// Returns an error naming the failing batch index; earlier batches stay
/// committed.
pub async fn import_records(
    store: &dyn LockerStore,
    records: &[LockerRecord],
) -> Result<u64, ImportError> {
    let mut written = 0u64;
    for (index, chunk) in records.chunks(IMPORT_BATCH_SIZE).enumerate() {
        written += store
            .upsert_batch(chunk)
            .await
            .map_err(|source| ImportError::Batch {
                batch: index,
                source,
            })?;
        tracing::debug!(batch = index, rows = chunk.len(), "Upserted batch");
    }
    Ok(written)
}
