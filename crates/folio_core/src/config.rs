//! Core runtime configuration.
//!
//! # Responsibility
//! - Describe where the store lives and how logging is initialized.
//! - Resolve overrides from `FOLIO_*` environment variables.
//!
//! # Invariants
//! - Defaults are usable as-is: in-memory store, 5s busy timeout, build-mode
//!   log level, logging disabled until `log_dir` is set.

use crate::db::DEFAULT_BUSY_TIMEOUT;
use crate::logging::{default_log_level, init_logging, LoggingError};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "FOLIO_DB_PATH";
pub const ENV_BUSY_TIMEOUT_MS: &str = "FOLIO_BUSY_TIMEOUT_MS";
pub const ENV_LOG_LEVEL: &str = "FOLIO_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "FOLIO_LOG_DIR";

/// Configuration resolution error.
#[derive(Debug)]
pub enum ConfigError {
    /// Environment variable value cannot be parsed.
    InvalidValue { key: &'static str, value: String },
    /// Logging backend refused initialization.
    Logging(LoggingError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value `{value}` for `{key}`")
            }
            Self::Logging(err) => write!(f, "logging init failed: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidValue { .. } => None,
            Self::Logging(err) => Some(err),
        }
    }
}

impl From<LoggingError> for ConfigError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

/// Store and logging settings for one process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// SQLite file path. `None` selects an in-memory store.
    pub db_path: Option<PathBuf>,
    /// How long a writer waits for the database lock.
    pub busy_timeout_ms: u64,
    pub log_level: String,
    /// Absolute log directory. `None` leaves logging uninitialized.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT.as_millis() as u64,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Builds a config from defaults overridden by process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from defaults overridden by `lookup` results.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = non_blank(lookup(ENV_DB_PATH)) {
            config.db_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = non_blank(lookup(ENV_BUSY_TIMEOUT_MS)) {
            config.busy_timeout_ms = raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: ENV_BUSY_TIMEOUT_MS,
                value: raw.clone(),
            })?;
        }
        if let Some(level) = non_blank(lookup(ENV_LOG_LEVEL)) {
            config.log_level = level;
        }
        if let Some(dir) = non_blank(lookup(ENV_LOG_DIR)) {
            config.log_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Starts file logging when `log_dir` is configured.
    ///
    /// Returns `Ok(false)` when no directory is configured.
    pub fn init_logging(&self) -> Result<bool, ConfigError> {
        let Some(dir) = self.log_dir.as_ref() else {
            return Ok(false);
        };
        init_logging(&self.log_level, dir)?;
        Ok(true)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{
        ConfigError, CoreConfig, ENV_BUSY_TIMEOUT_MS, ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL,
    };
    use crate::logging::LoggingError;
    use std::collections::HashMap;
    use std::error::Error;
    use std::path::PathBuf;
    use std::time::Duration;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_environment() {
        let config = CoreConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.busy_timeout(), Duration::from_secs(5));
        assert!(config.db_path.is_none());
    }

    #[test]
    fn overrides_are_read_and_trimmed() {
        let config = CoreConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, " /tmp/folio.db "),
            (ENV_BUSY_TIMEOUT_MS, "250"),
            (ENV_LOG_LEVEL, "warn"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/folio.db")));
        assert_eq!(config.busy_timeout(), Duration::from_millis(250));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn malformed_timeout_is_rejected() {
        let err = CoreConfig::from_lookup(lookup_from(&[(ENV_BUSY_TIMEOUT_MS, "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: ENV_BUSY_TIMEOUT_MS, ref value } if value == "soon"
        ));
        assert!(err.source().is_none());
    }

    #[test]
    fn init_logging_is_skipped_without_directory() {
        assert!(!CoreConfig::default().init_logging().unwrap());
    }

    #[test]
    fn logging_failure_keeps_its_typed_cause() {
        let config = CoreConfig::from_lookup(lookup_from(&[(ENV_LOG_DIR, "logs/relative")]))
            .unwrap();
        let err = config.init_logging().unwrap_err();

        assert!(matches!(
            err,
            ConfigError::Logging(LoggingError::InvalidDirectory(ref dir)) if dir == "logs/relative"
        ));
        let cause = err.source().unwrap();
        assert!(cause.downcast_ref::<LoggingError>().is_some());
    }
}
