//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Access-grant duration after a solved challenge
//! - Monitor loop tuning (poll interval, debounce) and the allow-list of
//!   packages that are never blocked
//!
//! Configuration is stored at `~/.config/unscroll/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

use super::data_dir;

/// Access-grant durations the user may pick from, in minutes.
pub const ACCESS_DURATION_OPTIONS: [u32; 7] = [1, 2, 3, 5, 10, 15, 30];

/// Access-grant configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Minutes of unblocked access earned by one challenge success.
    #[serde(default = "default_access_duration")]
    pub duration_minutes: u32,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            duration_minutes: default_access_duration(),
        }
    }
}

/// Monitor loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Suppress re-triggering the challenge flow for the same target within
    /// this window, so the poll loop doesn't flicker the overlay.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Our own identifier; never blocked.
    #[serde(default = "default_self_id")]
    pub self_id: String,
    /// OS/launcher/self-critical packages that are never blocked.
    #[serde(default = "default_allowlist")]
    pub allowlist: Vec<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            debounce_ms: default_debounce_ms(),
            self_id: default_self_id(),
            allowlist: default_allowlist(),
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/unscroll/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub access: AccessConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults if the file is absent.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::LoadFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Save the configuration.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, raw).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Set the access-grant duration, validated against the offered options.
    pub fn set_access_duration(&mut self, minutes: u32) -> Result<(), ConfigError> {
        if !ACCESS_DURATION_OPTIONS.contains(&minutes) {
            return Err(ConfigError::InvalidValue {
                key: "access.duration_minutes".to_string(),
                message: format!("{minutes} is not one of {ACCESS_DURATION_OPTIONS:?}"),
            });
        }
        self.access.duration_minutes = minutes;
        Ok(())
    }

    /// Access-grant duration as a chrono duration.
    pub fn access_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.access.duration_minutes as i64)
    }
}

fn default_access_duration() -> u32 {
    5
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_debounce_ms() -> u64 {
    2000
}

fn default_self_id() -> String {
    "com.unscroll.app".to_string()
}

fn default_allowlist() -> Vec<String> {
    [
        "com.android.systemui",
        "com.android.launcher",
        "com.android.launcher3",
        "com.google.android.apps.nexuslauncher",
        "com.android.settings",
        "com.android.vending",
        "com.android.phone",
        "com.android.dialer",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.access.duration_minutes, 5);
        assert_eq!(config.monitor.poll_interval_ms, 500);
        assert_eq!(config.monitor.debounce_ms, 2000);
        assert!(config
            .monitor
            .allowlist
            .iter()
            .any(|p| p == "com.android.systemui"));
    }

    #[test]
    fn access_duration_validation() {
        let mut config = Config::default();
        assert!(config.set_access_duration(30).is_ok());
        assert_eq!(config.access.duration_minutes, 30);
        assert!(config.set_access_duration(7).is_err());
        assert_eq!(config.access.duration_minutes, 30);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str("[access]\nduration_minutes = 10\n").unwrap();
        assert_eq!(config.access.duration_minutes, 10);
        assert_eq!(config.monitor.poll_interval_ms, 500);
    }
}
