//! Controller configuration parameters
//!
//! Fixed at startup; nothing here is runtime-mutable.  Values come from an
//! optional JSON file, falling back to [`ControllerConfig::default`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use core::fmt;

use log::info;
use serde::{Deserialize, Serialize};

use crate::pins;

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    // --- Timing ---
    /// Seconds between reconciliation polls
    pub poll_interval_secs: u64,
    /// Tolerance applied to both window edges (seconds)
    pub buffer_secs: u64,

    // --- Storage ---
    /// Path of the persisted `HH:MM,HH:MM` record
    pub schedule_path: PathBuf,

    // --- Relay ---
    /// GPIO driving the relay coil
    pub relay_gpio: u8,
    /// Relay energises on a LOW pin
    pub relay_active_low: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 10,
            buffer_secs: 10,
            schedule_path: PathBuf::from("last_set_times.txt"),
            relay_gpio: pins::RELAY_GPIO,
            relay_active_low: false,
        }
    }
}

/// Errors from loading or validating a [`ControllerConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    Io(io::Error),
    /// The config file is not valid JSON for this schema.
    Parse(serde_json::Error),
    /// A field failed range validation.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "config I/O error: {}", e),
            Self::Parse(e) => write!(f, "config parse error: {}", e),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::ValidationFailed(_) => None,
        }
    }
}

impl ControllerConfig {
    /// Load from `path`.  A missing file yields validated defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let cfg = match fs::read_to_string(path) {
            Ok(text) => {
                let cfg: Self = serde_json::from_str(&text).map_err(ConfigError::Parse)?;
                info!("Config loaded from {}", path.display());
                cfg
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No config at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=3600).contains(&self.poll_interval_secs) {
            return Err(ConfigError::ValidationFailed(
                "poll_interval_secs must be 1-3600",
            ));
        }
        if self.buffer_secs > 3600 {
            return Err(ConfigError::ValidationFailed("buffer_secs must be 0-3600"));
        }
        if self.schedule_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "schedule_path must not be empty",
            ));
        }
        if self.relay_gpio > pins::MAX_GPIO {
            return Err(ConfigError::ValidationFailed("relay_gpio must be 0-63"));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn buffer(&self) -> Duration {
        Duration::from_secs(self.buffer_secs)
    }
}
