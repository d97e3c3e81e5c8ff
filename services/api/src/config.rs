//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// The shortest session secret we accept for signing cookies.
pub const MIN_SECRET_LEN: usize = 16;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which adapter backs the session store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionBackend {
    Postgres,
    Memory,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub db_max_connections: u32,
    pub session_secret: String,
    pub session_backend: SessionBackend,
    pub session_ttl: Duration,
    pub cookie_secure: bool,
    pub static_dir: PathBuf,
    pub allowed_origin: Option<String>,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server ---
        let host: IpAddr = parse_or(&lookup, "HOST", "0.0.0.0")?;
        let port: u16 = parse_or(&lookup, "PORT", "3000")?;
        let bind_address = SocketAddr::new(host, port);

        // --- Database ---
        let database_url = required(&lookup, "DATABASE_URL")?;
        let db_max_connections: u32 = parse_or(&lookup, "DB_MAX_CONNECTIONS", "5")?;
        if db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "DB_MAX_CONNECTIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        // --- Sessions ---
        let session_secret = required(&lookup, "SESSION_SECRET")?;
        if session_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::InvalidValue(
                "SESSION_SECRET".to_string(),
                format!("must be at least {MIN_SECRET_LEN} characters"),
            ));
        }

        let backend_str = lookup("SESSION_STORE").unwrap_or_else(|| "postgres".to_string());
        let session_backend = match backend_str.to_lowercase().as_str() {
            "postgres" => SessionBackend::Postgres,
            "memory" => SessionBackend::Memory,
            other => {
                return Err(ConfigError::InvalidValue(
                    "SESSION_STORE".to_string(),
                    format!("'{}' is not one of postgres, memory", other),
                ))
            }
        };

        let ttl_secs: u64 = parse_or(&lookup, "SESSION_TTL_SECS", "86400")?;
        if ttl_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "SESSION_TTL_SECS".to_string(),
                "must be positive".to_string(),
            ));
        }
        let session_ttl = Duration::from_secs(ttl_secs);

        let cookie_secure: bool = parse_or(&lookup, "COOKIE_SECURE", "false")?;

        // --- Web ---
        let static_dir = lookup("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./public"));
        let allowed_origin = lookup("ALLOWED_ORIGIN").filter(|s| !s.trim().is_empty());

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            database_url,
            db_max_connections,
            session_secret,
            session_backend,
            session_ttl,
            cookie_secure,
            static_dir,
            allowed_origin,
            log_level,
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingVar(key.to_string()))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
}
