//! Configuration schema
//!
//! Type-safe configuration structs with serde defaults and validation.
//! Topics are registered in code (they carry converter functions); the
//! file only tunes the pipeline.

use serde::{Deserialize, Serialize};

/// Top-level Meridian configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MeridianConfig {
    /// Application settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Canonical-store dispatch settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Data-lake settings
    #[serde(default)]
    pub lake: LakeConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MeridianConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid setting found.
    pub fn validate(&self) -> Result<(), String> {
        if self.store.chunk_size == 0 {
            return Err("store.chunk_size must be at least 1".to_string());
        }
        if self.store.task_timeout_seconds == 0 {
            return Err("store.task_timeout_seconds must be at least 1".to_string());
        }
        if self.lake.task_timeout_seconds == 0 {
            return Err("lake.task_timeout_seconds must be at least 1".to_string());
        }
        if self.lake.root.trim_matches('/').is_empty() {
            return Err("lake.root must not be empty".to_string());
        }
        match self.application.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(format!(
                    "application.log_level '{other}' is invalid. Must be one of: trace, debug, info, warn, error"
                ));
            }
        }
        match self.logging.local_rotation.as_str() {
            "daily" | "hourly" => {}
            other => {
                return Err(format!(
                    "logging.local_rotation '{other}' is invalid. Must be one of: daily, hourly"
                ));
            }
        }
        Ok(())
    }
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name used in logs
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

/// Canonical-store dispatch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Records per batch upsert chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Per-chunk timeout in seconds
    #[serde(default = "default_task_timeout")]
    pub task_timeout_seconds: u64,

    /// Maximum chunks in flight; 0 means available parallelism
    #[serde(default)]
    pub max_concurrency: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            task_timeout_seconds: default_task_timeout(),
            max_concurrency: 0,
        }
    }
}

/// Data-lake settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LakeConfig {
    /// Root path prefix for uploads
    #[serde(default = "default_lake_root")]
    pub root: String,

    /// When true, lake uploads are detached and not awaited (at-most-once;
    /// upload outcomes are logged but absent from the publish response)
    #[serde(default)]
    pub fire_and_forget: bool,

    /// Per-upload timeout in seconds
    #[serde(default = "default_task_timeout")]
    pub task_timeout_seconds: u64,

    /// Maximum uploads in flight; 0 means available parallelism
    #[serde(default)]
    pub max_concurrency: usize,
}

impl Default for LakeConfig {
    fn default() -> Self {
        Self {
            root: default_lake_root(),
            fire_and_forget: false,
            task_timeout_seconds: default_task_timeout(),
            max_concurrency: 0,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether to write JSON logs to a local rolling file
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for local log files
    #[serde(default = "default_log_path")]
    pub local_path: String,

    /// Rotation policy: daily or hourly
    #[serde(default = "default_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_log_path(),
            local_rotation: default_rotation(),
        }
    }
}

fn default_app_name() -> String {
    "meridian".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_chunk_size() -> usize {
    25
}

fn default_task_timeout() -> u64 {
    20
}

fn default_lake_root() -> String {
    "lake".to_string()
}

fn default_log_path() -> String {
    "logs".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}
