use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsRecord {
    pub hotkey: String,
    pub root_dir: PathBuf,
    pub search_timeout: f64,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self {
            hotkey: String::new(),
            root_dir: PathBuf::new(),
            search_timeout: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Hotkey is required.")]
    MissingHotkey,
    #[error("Root directory is required.")]
    MissingRootDir,
    #[error("Root directory contains invalid characters.")]
    InvalidRootDir,
    #[error("Search timeout must be a positive number of seconds.")]
    InvalidTimeout,
}

impl SettingsRecord {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.hotkey.trim().is_empty() {
            return Err(SettingsError::MissingHotkey);
        }

        let root = self.root_dir.to_string_lossy();
        if root.trim().is_empty() {
            return Err(SettingsError::MissingRootDir);
        }
        if root.contains('\0') {
            return Err(SettingsError::InvalidRootDir);
        }

        if !self.search_timeout.is_finite() || self.search_timeout <= 0.0 {
            return Err(SettingsError::InvalidTimeout);
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub min_query_len: usize,
    pub debounce_ms: u64,
    pub request_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub max_results: usize,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            min_query_len: 4,
            debounce_ms: 0,
            request_timeout_ms: 5_000,
            connect_timeout_ms: 3_000,
            max_results: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("min_query_len must be at least 1")]
    MinQueryLen,
    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
    #[error("max_results must be greater than zero")]
    MaxResults,
}

impl PanelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_query_len == 0 {
            return Err(ConfigError::MinQueryLen);
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("request_timeout_ms"));
        }
        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("connect_timeout_ms"));
        }
        if self.max_results == 0 {
            return Err(ConfigError::MaxResults);
        }
        Ok(())
    }

    pub fn debounce(&self) -> Option<Duration> {
        (self.debounce_ms > 0).then(|| Duration::from_millis(self.debounce_ms))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}
