//! Logging and observability
//!
//! Structured logging built on the `tracing` crate: console output always,
//! optional rolling JSON file output.
//!
//! # Example
//!
//! ```no_run
//! use meridian::logging::init_logging;
//! use meridian::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Pipeline started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of a batch publication
#[macro_export]
macro_rules! log_publish_start {
    ($tenant:expr, $count:expr) => {
        tracing::info!(
            tenant = %$tenant,
            batch_size = $count,
            "Starting publication"
        );
    };
}

/// Log the completion of a batch publication
#[macro_export]
macro_rules! log_publish_complete {
    ($stored:expr, $failed:expr, $duration:expr) => {
        tracing::info!(
            stored = $stored,
            failed = $failed,
            duration_ms = $duration.as_millis() as u64,
            "Publication completed"
        );
    };
}
