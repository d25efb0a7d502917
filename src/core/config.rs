//! Configuration for the device discovery tool
//!
//! Supports loading configuration from a TOML file.
//! Configuration is stored in a standard location:
//! - Windows: %APPDATA%\device_roster\config.toml
//! - Linux/macOS: ~/.config/device_roster/config.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Application name used for config directory
const APP_NAME: &str = "device_roster";

/// Default config file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Get the standard configuration directory for the application.
///
/// Returns:
/// - Windows: %APPDATA%\device_roster
/// - Linux/macOS: ~/.config/device_roster
pub fn get_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_NAME))
    }

    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".config").join(APP_NAME))
    }
}

/// Get the standard configuration file path
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Initialize the configuration file if it doesn't exist.
///
/// Creates the config directory and writes the default config template.
/// Returns the path to the config file.
pub fn init_config() -> Result<PathBuf, ConfigError> {
    let config_dir = get_config_dir().ok_or(ConfigError::ConfigDirNotFound)?;

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)
            .map_err(|e| ConfigError::WriteError(config_dir.clone(), e.to_string()))?;
    }

    let config_path = config_dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        fs::write(&config_path, Config::generate_default_config())
            .map_err(|e| ConfigError::WriteError(config_path.clone(), e.to_string()))?;
    }

    Ok(config_path)
}

/// Errors raised while loading or writing configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Standard config directory could not be determined
    #[error("could not determine configuration directory")]
    ConfigDirNotFound,

    /// Config file could not be read
    #[error("failed to read config file {0}: {1}")]
    ReadError(PathBuf, String),

    /// Config file could not be written
    #[error("failed to write config file {0}: {1}")]
    WriteError(PathBuf, String),

    /// Config file is not valid TOML
    #[error("failed to parse config file {0}: {1}")]
    ParseError(PathBuf, String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Device selection settings
    pub device: DeviceConfig,

    /// Discovery timing settings
    pub discovery: DiscoveryConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Device selection settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Device to target by default; `"all"` selects every eligible device,
    /// absent means the default heuristic
    pub device_id: Option<String>,
}

/// Discovery timing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Milliseconds before the first background poll tick
    pub initial_poll_interval_ms: u64,
    /// Milliseconds between steady-state poll ticks
    pub steady_poll_interval_ms: u64,
    /// Seconds allowed for a single background enumeration
    pub poll_timeout_secs: u64,
    /// Seconds allowed per backend during a forced refresh
    pub refresh_timeout_secs: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            initial_poll_interval_ms: 4_000,
            steady_poll_interval_ms: 30_000,
            poll_timeout_secs: 30,
            refresh_timeout_secs: 10,
        }
    }
}

impl DiscoveryConfig {
    /// Per-backend budget for forced refreshes
    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_secs(self.refresh_timeout_secs)
    }

    /// Polling engine timing derived from this config
    pub fn polling_config(&self) -> crate::discovery::polling::PollingConfig {
        crate::discovery::polling::PollingConfig::default()
            .with_initial_interval(Duration::from_millis(self.initial_poll_interval_ms))
            .with_steady_interval(Duration::from_millis(self.steady_poll_interval_ms))
            .with_poll_timeout(Duration::from_secs(self.poll_timeout_secs))
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e.to_string()))?;
        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))
    }

    /// Load configuration from the standard location, or defaults when no
    /// file exists
    pub fn load_default() -> Result<Self, ConfigError> {
        match get_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Generate the commented default config file contents
    pub fn generate_default_config() -> String {
        let defaults = Config::default();
        let body = toml::to_string_pretty(&defaults).unwrap_or_default();
        format!(
            "# device_roster configuration\n\
             # device.device_id: target device (\"all\" for every device, omit for default)\n\
             # discovery.*: background polling and refresh timing\n\n{}",
            body
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.device.device_id.is_none());
        assert_eq!(config.discovery.initial_poll_interval_ms, 4_000);
        assert_eq!(config.discovery.steady_poll_interval_ms, 30_000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.device.device_id = Some("all".to_string());
        config.discovery.refresh_timeout_secs = 3;
        fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.device.device_id.as_deref(), Some("all"));
        assert_eq!(loaded.discovery.refresh_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.logging.level, "debug");
        assert_eq!(loaded.discovery.poll_timeout_secs, 30);
    }

    #[test]
    fn test_generated_default_parses() {
        let generated = Config::generate_default_config();
        let parsed: Config = toml::from_str(&generated).unwrap();
        assert_eq!(parsed.discovery.refresh_timeout_secs, 10);
    }

    #[test]
    fn test_invalid_config_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "not valid toml [[[").unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::ParseError(_, _))
        ));
    }
}
