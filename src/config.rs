//! Configuration management for pocket-todo.
//!
//! This module handles the `config.yaml` file in the data directory. Every
//! field is optional in the file; a missing file means all defaults.

use crate::error::{Error, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default seconds between reminder polls.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Database file to use instead of `todos.sqlite3` in the data directory.
    /// Relative paths are resolved against the data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Seconds between reminder polls while watching.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

const fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load config from `dir`, falling back to defaults if there is no file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or if
    /// the poll interval is zero.
    pub fn load_from(dir: &Path) -> Result<Self> {
        let config_path = paths::config_path_in(dir);
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        // An empty file deserializes to unit, not a mapping.
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Save config into `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let content = serde_yaml::to_string(self)?;
        std::fs::write(paths::config_path_in(dir), content)?;
        Ok(())
    }

    /// Check values that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a zero poll interval.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(Error::Config("poll_interval_secs must be at least 1".to_string()));
        }
        Ok(())
    }

    /// The database file for data directory `dir`.
    #[must_use]
    pub fn database_path(&self, dir: &Path) -> PathBuf {
        match &self.database_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => dir.join(path),
            None => paths::db_path_in(dir),
        }
    }

    /// Time between reminder polls.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
