//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Default check-in interval, used until the store holds a value
//! - Notification enablement
//!
//! The gesture timings (tap window, commit delay, decay rate, grace
//! period) are fixed behavior, not configuration.
//!
//! Configuration is stored at `~/.config/vigil/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use chrono::Duration;

use crate::error::ConfigError;

use super::data_dir;

/// Check-in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckinConfig {
    /// Interval applied on first launch, in hours. Typical choices are
    /// 8, 16, 24, or 32.
    #[serde(default = "default_interval_hours")]
    pub default_interval_hours: u32,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/vigil/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub checkin: CheckinConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

fn default_interval_hours() -> u32 {
    24
}
fn default_true() -> bool {
    true
}

impl Default for CheckinConfig {
    fn default() -> Self {
        Self {
            default_interval_hours: default_interval_hours(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            checkin: CheckinConfig::default(),
            notifications: NotificationsConfig::default(),
        }
    }
}

impl Config {
    /// Path of the config file inside the data directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/vigil"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when no file
    /// exists yet.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Write the configuration back out.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, raw).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// The first-launch check-in interval.
    pub fn default_interval(&self) -> Duration {
        Duration::hours(i64::from(self.checkin.default_interval_hours))
    }
}
