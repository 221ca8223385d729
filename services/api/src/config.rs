//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// When unset, plans and users live in process memory only.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub log_level: Level,
    pub write_retry_limit: u32,
    pub cors_allow_origin: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        let db_max_connections = parse_number("DB_MAX_CONNECTIONS", 5)?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Write Path and CORS Settings ---
        let write_retry_limit = parse_number("WRITE_RETRY_LIMIT", 3)?;
        let cors_allow_origin = std::env::var("CORS_ALLOW_ORIGIN").ok();

        Ok(Self {
            bind_address,
            database_url,
            db_max_connections,
            log_level,
            write_retry_limit,
            cors_allow_origin,
        })
    }
}

fn parse_number(var: &str, default: u32) -> Result<u32, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw.trim().parse::<u32>().map_err(|_| {
            ConfigError::InvalidValue(var.to_string(), format!("'{}' is not a number", raw))
        }),
        Err(_) => Ok(default),
    }
}
