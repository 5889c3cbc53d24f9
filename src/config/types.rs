use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub login_guard: LoginGuardConfig,
}

/// Connection settings for the REST backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to (e.g. "http://localhost:8080/api").
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Connection timeout in seconds (default: 5).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u32,
    /// Total request timeout in seconds. Unset means calls may wait forever.
    #[serde(default)]
    pub request_timeout_seconds: Option<u32>,
}

/// Thresholds of the login attempt guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginGuardConfig {
    /// Length of the short failure window (default: 30).
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
    /// Failures inside one window that trigger a lock (default: 3).
    #[serde(default = "default_window_max_failures")]
    pub window_max_failures: u32,
    /// Lock length after the window threshold is hit (default: 60).
    #[serde(default = "default_window_lock_seconds")]
    pub window_lock_seconds: u64,
    /// Cumulative failures since the last reset that trigger a lock (default: 5).
    #[serde(default = "default_max_failures")]
    pub max_failures: u32,
    /// Lock length after the cumulative threshold is hit (default: 30).
    #[serde(default = "default_lock_seconds")]
    pub lock_seconds: u64,
    /// Where the attempt record is persisted. Defaults to the user data dir.
    #[serde(default)]
    pub state_path: Option<PathBuf>,
}

impl ApiConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.connect_timeout_seconds))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_seconds
            .map(|secs| Duration::from_secs(u64::from(secs)))
    }
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_connect_timeout() -> u32 {
    5
}

fn default_window_seconds() -> u64 {
    30
}

fn default_window_max_failures() -> u32 {
    3
}

fn default_window_lock_seconds() -> u64 {
    60
}

fn default_max_failures() -> u32 {
    5
}

fn default_lock_seconds() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_seconds: default_connect_timeout(),
            request_timeout_seconds: None,
        }
    }
}

impl Default for LoginGuardConfig {
    fn default() -> Self {
        Self {
            window_seconds: default_window_seconds(),
            window_max_failures: default_window_max_failures(),
            window_lock_seconds: default_window_lock_seconds(),
            max_failures: default_max_failures(),
            lock_seconds: default_lock_seconds(),
            state_path: None,
        }
    }
}
