//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! pufff-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `PUFFF_DATABASE_URL` - `PostgreSQL` connection string
//! - `DATABASE_URL` - fallback connection string
//!
//! Migration files live under `crates/server/migrations/`.

use sqlx::PgPool;

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run database migrations.
///
/// # Errors
///
/// Returns an error if the connection string is missing, the database is
/// unreachable, or a migration fails to apply.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("PUFFF_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| MigrationError::MissingEnvVar("PUFFF_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
