//! Runtime configuration loaded from the environment.
//!
//! Command-line flags in the binary take precedence over these values.

use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
    #[error("Could not determine a default database location: {0}")]
    NoDataDir(String),
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Address the HTTP API binds to (COURSEGATE_BIND).
    pub bind_address: SocketAddr,
    /// SQLite database file (COURSEGATE_DATABASE), defaults to the platform data dir.
    pub database_path: PathBuf,
    /// Tracing filter directive (RUST_LOG).
    pub log_filter: String,
}

pub const DEFAULT_LOG_FILTER: &str = "coursegate=debug,tower_http=debug";

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup, so tests need not touch the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind = lookup("COURSEGATE_BIND").unwrap_or_else(|| "127.0.0.1:3000".to_string());
        let bind_address = bind
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("COURSEGATE_BIND".to_string(), e.to_string()))?;

        let database_path = match lookup("COURSEGATE_DATABASE") {
            Some(path) => PathBuf::from(path),
            None => crate::db::default_path().map_err(|e| ConfigError::NoDataDir(e.to_string()))?,
        };

        let log_filter = lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            bind_address,
            database_path,
            log_filter,
        })
    }
}
