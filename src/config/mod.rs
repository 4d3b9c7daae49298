//! Configuration management
//!
//! Handles loading, validation, and merging of configuration from:
//! - TOML files
//! - Environment variables (through the CLI)
//! - CLI arguments
//!
//! Every section and field is optional in the file; missing values take the
//! defaults below.
//!
//! ```toml
//! [devices]
//! directory = "/dev/input"
//! prefix = "event"
//!
//! [polling]
//! timeout_ms = 10
//!
//! [pointer]
//! throttle_ms = 40
//! clamp_policy = "per_axis"
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod types;

pub use types::{DevicesConfig, LoggingConfig, PointerConfig, PollingConfig};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Device discovery configuration
    pub devices: DevicesConfig,
    /// Poll loop configuration
    pub polling: PollingConfig,
    /// Pointer handling configuration
    pub pointer: PointerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, else the per-user file if present, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(default) if default.exists() => Self::load(&default),
            _ => Ok(Self::default()),
        }
    }

    /// Per-user config file location (`$XDG_CONFIG_HOME/lamco-input-capture/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lamco-input-capture").join("config.toml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.devices.directory.as_os_str().is_empty() {
            anyhow::bail!("Device directory must not be empty");
        }

        if self.devices.prefix.is_empty() {
            anyhow::bail!("Device prefix must not be empty");
        }

        if self.polling.timeout_ms == 0 {
            anyhow::bail!("Poll timeout must be at least 1 ms");
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Invalid log level: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" | "json" => {}
            _ => anyhow::bail!("Invalid log format: {}", self.logging.format),
        }

        Ok(())
    }

    /// Override config with CLI arguments
    pub fn with_overrides(
        mut self,
        device_dir: Option<PathBuf>,
        device_prefix: Option<String>,
        poll_timeout_ms: Option<u16>,
        throttle_ms: Option<u64>,
    ) -> Self {
        if let Some(dir) = device_dir {
            self.devices.directory = dir;
        }
        if let Some(prefix) = device_prefix {
            self.devices.prefix = prefix;
        }
        if let Some(timeout) = poll_timeout_ms {
            self.polling.timeout_ms = timeout;
        }
        if let Some(throttle) = throttle_ms {
            self.pointer.throttle_ms = throttle;
        }

        self
    }

    /// Relative motion throttle window
    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.pointer.throttle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::coordinates::ClampPolicy;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.devices.directory, PathBuf::from("/dev/input"));
        assert_eq!(config.devices.prefix, "event");
        assert_eq!(config.polling.timeout_ms, 10);
        assert_eq!(config.pointer.throttle_ms, 40);
        assert_eq!(config.pointer.clamp_policy, ClampPolicy::PerAxis);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [pointer]
            clamp_policy = "legacy"
            "#,
        )
        .unwrap();
        assert_eq!(config.pointer.clamp_policy, ClampPolicy::Legacy);
        assert_eq!(config.pointer.throttle_ms, 40);
        assert_eq!(config.devices, DevicesConfig::default());
    }

    #[test]
    fn test_config_validation_invalid_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = Config::default();
        config.polling.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_prefix() {
        let mut config = Config::default();
        config.devices.prefix.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Config::default().with_overrides(
            Some(PathBuf::from("/tmp/devs")),
            None,
            Some(25),
            Some(0),
        );
        assert_eq!(config.devices.directory, PathBuf::from("/tmp/devs"));
        assert_eq!(config.devices.prefix, "event");
        assert_eq!(config.polling.timeout_ms, 25);
        assert_eq!(config.throttle_interval(), Duration::ZERO);
    }
}
