use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/fasttea/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("fasttea").join("config.toml")
    }

    /// Loads configuration from the default config file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads and validates configuration from `path`.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - If the file exists, parses it as TOML and validates.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read_from(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses `path` without validating, so callers can apply overrides
    /// first. A missing file yields `Config::default()`.
    pub fn read_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::debug!(path = %path.display(), "Config file parsed");
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The bind address parses as `host:port`
    /// - Queue, event and session capacities are non-zero
    /// - The submit timeout and session sweep timings are non-zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::ValidationError {
                message: format!("Invalid bind address '{}'", self.server.bind_addr),
            });
        }

        if self.runtime.queue_capacity == 0 {
            return Err(ConfigError::ValidationError {
                message: "runtime.queue_capacity must be greater than zero".to_string(),
            });
        }

        if self.runtime.event_capacity == 0 {
            return Err(ConfigError::ValidationError {
                message: "runtime.event_capacity must be greater than zero".to_string(),
            });
        }

        if self.runtime.submit_timeout_ms == 0 {
            return Err(ConfigError::ValidationError {
                message: "runtime.submit_timeout_ms must be greater than zero".to_string(),
            });
        }

        if self.sessions.max_sessions == 0 {
            return Err(ConfigError::ValidationError {
                message: "sessions.max_sessions must be greater than zero".to_string(),
            });
        }

        if self.sessions.idle_timeout_seconds == 0 {
            return Err(ConfigError::ValidationError {
                message: "sessions.idle_timeout_seconds must be greater than zero".to_string(),
            });
        }

        if self.sessions.sweep_interval_seconds == 0 {
            return Err(ConfigError::ValidationError {
                message: "sessions.sweep_interval_seconds must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}
