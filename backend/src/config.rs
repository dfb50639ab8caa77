use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_QUOTE_API_URL: &str = "https://stock-price-checker-proxy.freecodecamp.rocks";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// SQLite connection string, opened through the sqlx `Any` driver.
    pub database_url: String,

    /// Maximum pooled database connections.
    pub db_max_connections: u32,

    // =========================
    // Like fingerprinting
    // =========================
    /// Server-held bcrypt salt, e.g. `$2b$10$abcdefghijklmnopqrstuu`.
    ///
    /// The same salt must be kept across restarts: changing it changes every
    /// caller's fingerprint, so previous likes no longer deduplicate.
    pub hash_salt: String,

    // =========================
    // Upstream quote service
    // =========================
    /// Base URL of the quote service; `/v1/stock/{ticker}/quote` is appended.
    pub quote_api_url: String,

    /// Per-call upstream timeout. A hung quote call fails the request as
    /// "upstream unavailable" once this elapses.
    pub quote_api_timeout: Duration,

    // =========================
    // HTTP server
    // =========================
    pub bind_addr: String,
    pub port: u16,

    /// Take the caller address from `Forwarded` / `X-Forwarded-For` instead of
    /// the socket peer. Only enable behind a proxy that overwrites those headers.
    pub trust_proxy: bool,

    /// `APP_ENV=production` switches logs to JSON.
    pub is_production: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests don't have to touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .unwrap_or_else(|| "sqlite://stock_likes.db?mode=rwc".to_string());

        let hash_salt = lookup("HASH_SALT").ok_or(ConfigError::Missing("HASH_SALT"))?;

        let quote_api_url = lookup("QUOTE_API_URL")
            .unwrap_or_else(|| DEFAULT_QUOTE_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let timeout_ms: u64 = parse_or(&lookup, "QUOTE_API_TIMEOUT_MS", 5_000)?;
        let port: u16 = parse_or(&lookup, "PORT", 3_000)?;
        let db_max_connections: u32 = parse_or(&lookup, "DB_MAX_CONNECTIONS", 16)?;
        let trust_proxy: bool = parse_or(&lookup, "TRUST_PROXY", false)?;

        Ok(Self {
            database_url,
            db_max_connections,
            hash_salt,
            quote_api_url,
            quote_api_timeout: Duration::from_millis(timeout_ms),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            trust_proxy,
            is_production: lookup("APP_ENV").unwrap_or_default() == "production",
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
