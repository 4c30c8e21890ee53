//! Runtime configuration for hosts embedding the core.
//!
//! # Responsibility
//! - Resolve database location, storage key and logging options.
//! - Validate values before any store is opened.
//!
//! # Invariants
//! - Every field has a default, so an empty JSON object is a valid config.
//! - Environment values override defaults field by field.

use crate::logging::{default_log_level, normalize_level};
use crate::store::DEFAULT_STORAGE_KEY;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const DEFAULT_DB_FILE_NAME: &str = "taskboard.sqlite3";
const ENV_DB_PATH: &str = "TASKBOARD_DB_PATH";
const ENV_STORAGE_KEY: &str = "TASKBOARD_STORAGE_KEY";
const ENV_LOG_LEVEL: &str = "TASKBOARD_LOG_LEVEL";
const ENV_LOG_DIR: &str = "TASKBOARD_LOG_DIR";

static STORAGE_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_.\-]{0,63}$").expect("valid storage key regex"));

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// JSON config could not be decoded.
    Parse(String),
    InvalidStorageKey(String),
    InvalidLogLevel(String),
    /// Log directory must be absolute.
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "invalid taskboard config: {message}"),
            Self::InvalidStorageKey(key) => write!(f, "invalid storage key `{key}`"),
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
            Self::RelativeLogDir(path) => {
                write!(f, "log_dir must be an absolute path, got `{}`", path.display())
            }
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaskboardConfig {
    /// SQLite file holding the task record.
    pub db_path: PathBuf,
    /// Key of the task collection record.
    pub storage_key: String,
    pub log_level: String,
    /// Rolling log directory; logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for TaskboardConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl TaskboardConfig {
    /// Parses and validates a JSON config.
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(payload).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Builds a config from `TASKBOARD_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let mut config = Self::default();
        if let Some(path) = non_blank(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path.trim());
        }
        if let Some(key) = non_blank(ENV_STORAGE_KEY) {
            config.storage_key = key.trim().to_string();
        }
        if let Some(level) = non_blank(ENV_LOG_LEVEL) {
            config.log_level = level.trim().to_string();
        }
        if let Some(dir) = non_blank(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir.trim()));
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !STORAGE_KEY_RE.is_match(&self.storage_key) {
            return Err(ConfigError::InvalidStorageKey(self.storage_key.clone()));
        }
        normalize_level(&self.log_level).map_err(ConfigError::InvalidLogLevel)?;
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, TaskboardConfig};
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn empty_json_uses_defaults() {
        let config = TaskboardConfig::from_json_str("{}").unwrap();
        assert_eq!(config, TaskboardConfig::default());
        assert_eq!(config.storage_key, "todos");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = TaskboardConfig::from_json_str(r#"{"dbPath":"x"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn lookup_overrides_and_validates() {
        let vars = HashMap::from([
            ("TASKBOARD_DB_PATH", "/tmp/board.sqlite3"),
            ("TASKBOARD_LOG_LEVEL", " WARNING "),
            ("TASKBOARD_STORAGE_KEY", "   "),
        ]);
        let config =
            TaskboardConfig::from_lookup(|name| vars.get(name).map(|value| value.to_string()))
                .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/board.sqlite3"));
        assert_eq!(config.log_level, "WARNING");
        assert_eq!(config.storage_key, "todos");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = TaskboardConfig::from_json_str(r#"{"storage_key":"Todos!"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidStorageKey(_)));

        let err = TaskboardConfig::from_json_str(r#"{"log_level":"loud"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogLevel(_)));

        let err = TaskboardConfig::from_json_str(r#"{"log_dir":"logs"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::RelativeLogDir(_)));
    }
}
