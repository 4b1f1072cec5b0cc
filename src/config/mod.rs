//! Configuration management for Meridian.
//!
//! TOML-based configuration loading with environment variable substitution
//! (`${VAR_NAME}`), `MERIDIAN_*` overrides, defaults for every setting, and
//! validation on load.
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! name = "meridian"
//! log_level = "info"
//!
//! [store]
//! chunk_size = 25
//! task_timeout_seconds = 20
//!
//! [lake]
//! root = "clinical/lake"
//! fire_and_forget = false
//!
//! [logging]
//! local_enabled = false
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{ApplicationConfig, LakeConfig, LoggingConfig, MeridianConfig, StoreConfig};
