//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PUFFF_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `PUFFF_BASE_URL` - Origin of the storefront frontend, used as the CORS allowed origin
//! - `AUTH_BASE_URL` - Identity provider base URL
//! - `AUTH_SERVICE_KEY` - Service key presented on identity provider calls (high entropy, server-side only)
//!
//! ## Optional
//! - `PUFFF_HOST` - Bind address (default: 127.0.0.1)
//! - `PUFFF_PORT` - Listen port (default: 3000)
//! - `ADMIN_EMAILS` - Comma-separated admin allow-list (quotes stripped, case-folded)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//!
//! `ADMIN_EMAILS` is the single canonical allow-list source; earlier
//! deployments read two differently-parsed variables for the same purpose,
//! which was drift, not design.

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Origin of the storefront frontend, allowed by CORS
    pub base_url: String,
    /// Identity provider configuration
    pub auth: AuthConfig,
    /// Admin allow-list: lowercased, quote-stripped emails
    pub admin_emails: BTreeSet<String>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Identity provider configuration.
///
/// Implements `Debug` manually to redact the service key.
#[derive(Clone)]
pub struct AuthConfig {
    /// Identity provider base URL (e.g., `https://auth.pufff.store`)
    pub base_url: Url,
    /// Service key sent as the `apikey` header on provider calls
    pub service_key: SecretString,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("base_url", &self.base_url.as_str())
            .field("service_key", &"[REDACTED]")
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the service key fails validation (placeholder detection, entropy
    /// check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("PUFFF_DATABASE_URL")?;
        let host = get_env_or_default("PUFFF_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("PUFFF_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PUFFF_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PUFFF_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("PUFFF_BASE_URL")?;

        let auth = AuthConfig::from_env()?;
        let admin_emails = parse_allow_list(&get_env_or_default("ADMIN_EMAILS", ""));
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            auth,
            admin_emails,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_required_env("AUTH_BASE_URL")?;
        let base_url = Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("AUTH_BASE_URL".to_string(), e.to_string()))?;

        Ok(Self {
            base_url,
            service_key: get_validated_secret("AUTH_SERVICE_KEY")?,
        })
    }
}

/// Parse the admin allow-list environment string.
///
/// Entries are comma-separated; each entry is trimmed, stripped of one pair
/// of surrounding quotes, and lowercased. Empty entries are dropped.
#[must_use]
pub fn parse_allow_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(strip_quotes)
        .map(|e| e.to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

fn strip_quotes(entry: &str) -> &str {
    let entry = entry.trim();
    entry
        .strip_prefix('"')
        .and_then(|e| e.strip_suffix('"'))
        .or_else(|| {
            entry
                .strip_prefix('\'')
                .and_then(|e| e.strip_suffix('\''))
        })
        .unwrap_or(entry)
        .trim()
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the real service key."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
