//! Configuration type definitions

use crate::input::coordinates::ClampPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Device discovery configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevicesConfig {
    /// Directory scanned once at startup
    pub directory: PathBuf,

    /// Only nodes whose file name starts with this prefix are opened
    pub prefix: String,
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("/dev/input"),
            prefix: "event".to_string(),
        }
    }
}

/// Poll loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Upper bound on one blocking wait, in milliseconds
    pub timeout_ms: u16,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { timeout_ms: 10 }
    }
}

/// Pointer handling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    /// Minimum milliseconds between delivered relative moves.
    /// Default: 40. Set to 0 to disable.
    pub throttle_ms: u64,

    /// Clamp applied after relative motion ("per_axis", "legacy")
    pub clamp_policy: ClampPolicy,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            throttle_ms: 40,
            clamp_policy: ClampPolicy::PerAxis,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level ("trace", "debug", "info", "warn", "error")
    pub level: String,

    /// Output format ("pretty", "compact", "json")
    pub format: String,

    /// Log file (None = console only)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}
