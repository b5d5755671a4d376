//! Configuration management for the dashboard shell
//!
//! Handles persistent settings for the refresh cadence and the optional
//! loader command. Supports Windows, macOS, and Linux.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::agents::RefreshConfig;
use crate::loader::CommandLoader;

/// Errors from loading, saving or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Could not read or write the config file
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for this schema
    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range
    #[error("Invalid config value: {0}")]
    Invalid(String),

    /// No per-user config directory on this platform
    #[error("Could not determine config path")]
    NoConfigDir,
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Seconds between timer-driven refreshes
    pub refresh_interval_secs: u64,
    /// Refresh immediately when the environment becomes ready
    pub fetch_on_start: bool,
    /// Command run on every refresh (program first), if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loader_command: Option<Vec<String>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 30,
            fetch_on_start: true,
            loader_command: None,
        }
    }
}

impl AppConfig {
    /// Gets the config directory path (cross-platform)
    fn config_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("APPDATA")
                .ok()
                .map(|p| PathBuf::from(p).join("Coinwatch"))
        }

        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|p| PathBuf::from(p).join("Library/Application Support/Coinwatch"))
        }

        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_CONFIG_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| std::env::var("HOME").ok().map(|p| PathBuf::from(p).join(".config")))
                .map(|p| p.join("coinwatch"))
        }

        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }

    /// Gets the config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.json"))
    }

    /// Loads configuration from the per-user config file
    ///
    /// Falls back to defaults when the file is missing or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Loads configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the per-user config file
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Saves configuration to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Checks value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "refresh_interval_secs must be greater than zero".to_string(),
            ));
        }
        if matches!(self.loader_command, Some(ref argv) if argv.is_empty()) {
            return Err(ConfigError::Invalid(
                "loader_command must name a program".to_string(),
            ));
        }
        Ok(())
    }

    /// Refresh cadence for the trigger
    pub fn refresh_config(&self) -> Result<RefreshConfig, ConfigError> {
        self.validate()?;
        Ok(RefreshConfig {
            interval: Duration::from_secs(self.refresh_interval_secs),
            fetch_on_start: self.fetch_on_start,
        })
    }

    /// Loader for the configured command, if any
    pub fn command_loader(&self) -> Option<CommandLoader> {
        self.loader_command
            .as_deref()
            .and_then(CommandLoader::from_argv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.refresh_interval_secs, 30);
        assert!(config.fetch_on_start);
        assert!(config.loader_command.is_none());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"fetch_on_start": false}"#).unwrap();
        assert_eq!(config.refresh_interval_secs, 30);
        assert!(!config.fetch_on_start);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = AppConfig {
            refresh_interval_secs: 10,
            fetch_on_start: false,
            loader_command: Some(vec!["refresh-coins".to_string(), "--all".to_string()]),
        };

        config.save_to(&path).unwrap();
        let loaded = AppConfig::load_from(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");

        assert!(matches!(AppConfig::load_from(&path), Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = AppConfig {
            refresh_interval_secs: 0,
            ..AppConfig::default()
        };

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        assert!(config.refresh_config().is_err());
    }

    #[test]
    fn test_empty_loader_command_rejected() {
        let config = AppConfig {
            loader_command: Some(vec![]),
            ..AppConfig::default()
        };

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_refresh_config_conversion() {
        let config = AppConfig {
            refresh_interval_secs: 45,
            fetch_on_start: false,
            loader_command: None,
        };

        let refresh = config.refresh_config().unwrap();
        assert_eq!(refresh.interval, Duration::from_secs(45));
        assert!(!refresh.fetch_on_start);
    }

    #[test]
    fn test_command_loader() {
        let mut config = AppConfig::default();
        assert!(config.command_loader().is_none());

        config.loader_command = Some(vec!["refresh-coins".to_string()]);
        assert_eq!(config.command_loader().unwrap().program(), "refresh-coins");
    }
}
