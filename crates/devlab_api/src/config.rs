//! Boundary configuration loaded from the environment.
//!
//! # Invariants
//! - Unset or blank variables fall back to defaults; loading never fails.

use devlab_core::db::{open_db, DbResult};
use devlab_core::{default_log_level, init_logging, LoggingError};
use rusqlite::Connection;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "DEVLAB_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "DEVLAB_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "DEVLAB_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "devlab.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "devlab-logs";

/// Runtime settings for the boundary and the CLI smoke check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl ApiConfig {
    /// Reads `DEVLAB_DB_PATH`, `DEVLAB_LOG_LEVEL` and `DEVLAB_LOG_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_level: read(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME)),
        }
    }

    /// Starts core file logging with this config.
    pub fn init_logging(&self) -> Result<(), LoggingError> {
        init_logging(&self.log_level, &self.log_dir.to_string_lossy())
    }

    /// Opens the configured database with migrations applied.
    pub fn open_db(&self) -> DbResult<Connection> {
        open_db(&self.db_path)
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn explicit_values_win() {
        let env: HashMap<&str, &str> = HashMap::from([
            (DB_PATH_ENV, "/srv/devlab/app.db"),
            (LOG_LEVEL_ENV, " warn "),
            (LOG_DIR_ENV, "/var/log/devlab"),
        ]);
        let config = ApiConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.db_path, PathBuf::from("/srv/devlab/app.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, PathBuf::from("/var/log/devlab"));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = ApiConfig::from_lookup(|_| Some("   ".to_string()));
        assert!(config.db_path.ends_with("devlab.sqlite3"));
        assert!(config.log_dir.ends_with("devlab-logs"));
        assert!(!config.log_level.is_empty());
    }

    #[test]
    fn from_env_reads_the_process_environment() {
        let expected = ApiConfig::from_lookup(|key| std::env::var(key).ok());
        assert_eq!(ApiConfig::from_env(), expected);
    }

    #[test]
    fn open_db_uses_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = ApiConfig {
            db_path: dir.path().join("devlab.db"),
            log_level: "info".to_string(),
            log_dir: dir.path().join("logs"),
        };
        config.open_db().unwrap();
        assert!(config.db_path.exists());
    }
}
