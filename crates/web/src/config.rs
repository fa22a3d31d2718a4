use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Without a database the pool runs on the in-memory store.
    pub database_url: Option<String>,
    pub api_keys: String,
    /// Path to a tournament format JSON. Defaults to the embedded 2026 format.
    pub tournament_format: Option<String>,
    pub predictions_lock_at: Option<DateTime<Utc>>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let predictions_lock_at = match std::env::var("PREDICTIONS_LOCK_AT") {
            Ok(value) => Some(
                DateTime::parse_from_rfc3339(&value)
                    .context("PREDICTIONS_LOCK_AT must be an RFC 3339 timestamp")?
                    .with_timezone(&Utc),
            ),
            Err(_) => None,
        };

        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("PORT must be a number")?
                .parse()?,
            database_url: std::env::var("DATABASE_URL").ok(),
            api_keys: std::env::var("API_KEYS").unwrap_or_default(),
            tournament_format: std::env::var("TOURNAMENT_FORMAT").ok(),
            predictions_lock_at,
        })
    }
}
