//! Environment-driven server configuration.
//!
//! # Invariants
//! - Blank variables are treated as unset.
//! - An unparsable bind address is a startup error, never a silent default.

use std::net::SocketAddr;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "WORKOUT_DB_PATH";
pub const BIND_ADDR_ENV: &str = "WORKOUT_BIND_ADDR";
pub const LOG_LEVEL_ENV: &str = "WORKOUT_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "WORKOUT_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "workout_tracker.sqlite3";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Runtime settings for the workout server process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// SQLite file opened once at startup.
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` logs to stderr.
    pub log_dir: Option<String>,
}

impl ServerConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, applying defaults for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|trimmed| !trimmed.is_empty())
        };

        let db_path = value(DB_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));

        let raw_addr = value(BIND_ADDR_ENV).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .parse::<SocketAddr>()
            .map_err(|err| format!("invalid {BIND_ADDR_ENV} `{raw_addr}`: {err}"))?;

        let log_level = value(LOG_LEVEL_ENV)
            .unwrap_or_else(|| workout_core::default_log_level().to_string());

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            log_dir: value(LOG_DIR_ENV),
        })
    }
}
