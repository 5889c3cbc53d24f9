use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;

/// Upper bound on every login guard window and lock length.
const MAX_GUARD_SECONDS: u64 = 7 * 24 * 60 * 60;

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
    /// Returns the directory holding the config file.
    ///
    /// Uses `~/.config/pinclient` on Unix/macOS, or equivalent on other
    /// platforms via `dirs::config_dir()`. Falls back to the current
    /// directory if config_dir is unavailable.
    pub fn config_dir() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("pinclient")
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Directory for client-local state (attempt record, session).
    pub fn data_dir() -> PathBuf {
        let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        data_dir.join("pinclient")
    }

    /// Loads configuration from the default config file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - If the file exists, parses it as TOML and validates.
    /// - Returns an error if reading, parsing, or validation fails.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
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

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The base URL is an absolute http(s) URL
    /// - Every guard threshold and lock length is non-zero
    /// - No guard window or lock is longer than a week
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.api.base_url).map_err(|e| {
            ConfigError::ValidationError {
                message: format!("Invalid api.base_url '{}': {}", self.api.base_url, e),
            }
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError {
                message: format!("api.base_url must use http or https, got '{}'", url.scheme()),
            });
        }

        let guard = &self.login_guard;
        let zero_field = [
            ("window_seconds", guard.window_seconds == 0),
            ("window_max_failures", guard.window_max_failures == 0),
            ("window_lock_seconds", guard.window_lock_seconds == 0),
            ("max_failures", guard.max_failures == 0),
            ("lock_seconds", guard.lock_seconds == 0),
        ]
        .into_iter()
        .find_map(|(name, is_zero)| is_zero.then_some(name));

        if let Some(name) = zero_field {
            return Err(ConfigError::ValidationError {
                message: format!("login_guard.{} must be greater than zero", name),
            });
        }

        let oversized = [
            ("window_seconds", guard.window_seconds),
            ("window_lock_seconds", guard.window_lock_seconds),
            ("lock_seconds", guard.lock_seconds),
        ]
        .into_iter()
        .find(|(_, secs)| *secs > MAX_GUARD_SECONDS);

        if let Some((name, secs)) = oversized {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "login_guard.{} is {} but must be at most {} (one week)",
                    name, secs, MAX_GUARD_SECONDS
                ),
            });
        }

        Ok(())
    }

    /// Location of the persisted login attempt record.
    pub fn attempt_record_path(&self) -> PathBuf {
        self.login_guard
            .state_path
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("login_attempts.json"))
    }

    /// Location of the persisted CLI session.
    pub fn session_path(&self) -> PathBuf {
        Self::data_dir().join("session.json")
    }
}
