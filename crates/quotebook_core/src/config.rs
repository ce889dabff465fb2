//! Runtime configuration.
//!
//! # Responsibility
//! - Load optional TOML configuration with defaults for every field.
//! - Resolve data, database, and log locations.
//!
//! # Invariants
//! - A missing config file is not an error; defaults apply.
//! - `validate()` runs on every load path.

use crate::sync::engine::RetryPolicy;
use crate::sync::reconcile::MergePolicy;
use crate::sync::remote::{LatencyRange, MOCK_SERVER_URL};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "QUOTEBOOK_DATA_DIR";

const APP_DIR_NAME: &str = "quotebook";
const DB_FILE_NAME: &str = "quotebook.sqlite3";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config file: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuotebookConfig {
    /// Directory holding the database and logs.
    pub data_dir: Option<PathBuf>,
    /// Log level; falls back to the build-mode default.
    pub log_level: Option<String>,
    /// Seed the built-in quotes into an empty book on startup.
    pub seed_defaults: bool,
    pub sync: SyncConfig,
}

impl Default for QuotebookConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_level: None,
            seed_defaults: true,
            sync: SyncConfig::default(),
        }
    }
}

/// `[sync]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    pub interval_secs: u64,
    pub policy: MergePolicy,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub endpoint: String,
    pub fetch_latency: LatencyRange,
    pub post_latency: LatencyRange,
}

impl Default for SyncConfig {
    fn default() -> Self {
        let retry = RetryPolicy::none();
        Self {
            interval_secs: 30,
            policy: MergePolicy::Additive,
            max_attempts: retry.max_attempts,
            initial_backoff_ms: retry.initial_backoff.as_millis() as u64,
            max_backoff_ms: retry.max_backoff.as_millis() as u64,
            endpoint: MOCK_SERVER_URL.to_string(),
            fetch_latency: LatencyRange::new(1_000, 2_000),
            post_latency: LatencyRange::new(500, 1_500),
        }
    }
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
        }
    }
}

impl QuotebookConfig {
    /// Loads `path` when it exists, otherwise returns validated defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            _ => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sync = &self.sync;
        if sync.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "sync.interval_secs must be greater than 0".to_string(),
            ));
        }
        if sync.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "sync.max_attempts must be at least 1".to_string(),
            ));
        }
        if sync.initial_backoff_ms > sync.max_backoff_ms {
            return Err(ConfigError::Invalid(format!(
                "sync.initial_backoff_ms ({}) exceeds sync.max_backoff_ms ({})",
                sync.initial_backoff_ms, sync.max_backoff_ms
            )));
        }
        for (name, range) in [
            ("fetch_latency", sync.fetch_latency),
            ("post_latency", sync.post_latency),
        ] {
            if !range.is_valid() {
                return Err(ConfigError::Invalid(format!(
                    "sync.{name}.min_ms ({}) exceeds max_ms ({})",
                    range.min_ms, range.max_ms
                )));
            }
        }
        Ok(())
    }

    /// Resolves the data directory.
    ///
    /// Order: explicit override, `QUOTEBOOK_DATA_DIR`, config, platform data
    /// dir, then `./.quotebook`.
    pub fn resolve_data_dir(&self, override_dir: Option<&Path>) -> PathBuf {
        if let Some(dir) = override_dir {
            return dir.to_path_buf();
        }
        if let Ok(raw) = std::env::var(DATA_DIR_ENV) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(".").join(format!(".{APP_DIR_NAME}")))
    }

    pub fn db_path(data_dir: &Path) -> PathBuf {
        data_dir.join(DB_FILE_NAME)
    }

    pub fn log_dir(data_dir: &Path) -> PathBuf {
        data_dir.join(LOG_DIR_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, QuotebookConfig};
    use crate::sync::reconcile::MergePolicy;
    use std::path::Path;

    #[test]
    fn empty_file_yields_defaults() {
        let config = QuotebookConfig::from_toml_str("").unwrap();
        assert_eq!(config, QuotebookConfig::default());
        assert_eq!(config.sync.interval_secs, 30);
        assert_eq!(config.sync.max_attempts, 1);
    }

    #[test]
    fn parses_partial_sync_table() {
        let config = QuotebookConfig::from_toml_str(
            r#"
            seed_defaults = false

            [sync]
            interval_secs = 5
            policy = "server-overwrite"
            fetch_latency = { min_ms = 0, max_ms = 10 }
            "#,
        )
        .unwrap();
        assert!(!config.seed_defaults);
        assert_eq!(config.sync.interval_secs, 5);
        assert_eq!(config.sync.policy, MergePolicy::ServerOverwrite);
        assert_eq!(config.sync.fetch_latency.max_ms, 10);
        assert_eq!(config.sync.post_latency.min_ms, 500);
    }

    #[test]
    fn rejects_zero_interval_and_inverted_latency() {
        let zero = QuotebookConfig::from_toml_str("[sync]\ninterval_secs = 0\n").unwrap_err();
        assert!(matches!(zero, ConfigError::Invalid(_)));

        let inverted = QuotebookConfig::from_toml_str(
            "[sync]\npost_latency = { min_ms = 9, max_ms = 1 }\n",
        )
        .unwrap_err();
        assert!(inverted.to_string().contains("post_latency"));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = QuotebookConfig::from_toml_str("colour = \"blue\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn explicit_override_wins_for_data_dir() {
        let config = QuotebookConfig::default();
        let dir = config.resolve_data_dir(Some(Path::new("/tmp/quotes-here")));
        assert_eq!(dir, Path::new("/tmp/quotes-here"));
        assert_eq!(
            QuotebookConfig::db_path(&dir),
            Path::new("/tmp/quotes-here/quotebook.sqlite3")
        );
    }
}
