//! Configuration management for the logger

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::logging::rotation;
use crate::logging::{LogLevel, OutputTarget};

/// Application name used for platform directories when none is configured
pub const DEFAULT_APP_NAME: &str = "applog";

/// File name of the logger config inside the config directory
pub const CONFIG_FILE_NAME: &str = "logging.toml";

/// Logger configuration
///
/// Every field is optional in the config file; missing fields take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// Entries below this level are dropped
    pub min_level: LogLevel,

    /// Console, file, or both
    pub target: OutputTarget,

    /// Directory for log files (empty = platform data dir + "/logs")
    pub log_directory: PathBuf,

    /// Active file is `<prefix>.log`, backups `<prefix>_<n>.log`
    ///
    /// Loggers sharing a directory need prefixes that do not collide: the
    /// active file of prefix `app_2` is indistinguishable from backup 2 of
    /// prefix `app`, and would be shifted or pruned as one.
    pub log_file_prefix: String,

    /// Rotate before a write would grow the active file past this many bytes (0 = never)
    pub max_file_size: u64,

    /// Number of numbered backups to keep (0 = keep none)
    pub max_file_count: usize,

    pub enable_timestamp: bool,
    pub enable_category: bool,
    pub enable_function: bool,
    pub enable_line_number: bool,
    pub enable_thread_id: bool,

    /// Buffer file output and flush it on a timer; when false every entry is flushed
    pub auto_flush: bool,

    /// Flush timer period in milliseconds (0 = no timer)
    pub flush_interval_ms: u64,

    /// Separator placed between formatted fields
    pub field_separator: String,

    /// Names the default data directory
    pub app_name: String,
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024 // 10 MiB
}

fn default_max_file_count() -> usize {
    5
}

fn default_flush_interval_ms() -> u64 {
    1000
}

fn default_field_separator() -> String {
    " | ".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Debug,
            target: OutputTarget::Both,
            log_directory: PathBuf::new(),
            log_file_prefix: "app".to_string(),
            max_file_size: default_max_file_size(),
            max_file_count: default_max_file_count(),
            enable_timestamp: true,
            enable_category: true,
            enable_function: true,
            enable_line_number: true,
            enable_thread_id: true,
            auto_flush: true,
            flush_interval_ms: default_flush_interval_ms(),
            field_separator: default_field_separator(),
            app_name: DEFAULT_APP_NAME.to_string(),
        }
    }
}

impl LogConfig {
    /// Load configuration from file, or return default if not found
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read logger config")?;
            toml::from_str(&content).context("Failed to parse logger config")
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file, creating its directory if needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize logger config")?;
        std::fs::write(path, content).context("Failed to write logger config")?;
        Ok(())
    }

    /// The log directory, with an empty path replaced by the platform default
    pub fn resolved_log_directory(&self) -> PathBuf {
        if self.log_directory.as_os_str().is_empty() {
            default_log_dir(&self.app_name)
        } else {
            self.log_directory.clone()
        }
    }

    /// Path of the active log file
    pub fn active_log_path(&self) -> PathBuf {
        rotation::active_path(&self.resolved_log_directory(), &self.log_file_prefix)
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }
}

/// Get the application data directory (e.g. ~/.local/share/<app>)
/// Falls back to ./<app> if the platform has no data directory
pub fn data_dir(app_name: &str) -> PathBuf {
    try_data_dir(app_name).unwrap_or_else(|| {
        tracing::warn!("Could not determine data directory, using current directory for logs");
        PathBuf::from(app_name)
    })
}

/// Try to get the application data directory, returning None if unavailable
pub fn try_data_dir(app_name: &str) -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join(app_name))
}

/// Get the default logs directory
pub fn default_log_dir(app_name: &str) -> PathBuf {
    data_dir(app_name).join("logs")
}

/// Get the path to the logger config file
/// Falls back to ./<app>/logging.toml if the platform has no config directory
pub fn config_file_path(app_name: &str) -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join(app_name))
        .unwrap_or_else(|| PathBuf::from(app_name))
        .join(CONFIG_FILE_NAME)
}
