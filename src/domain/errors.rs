//! Domain error types
//!
//! Error hierarchy for the publication pipeline. All errors are
//! domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Meridian error type
///
/// This is the primary error type used throughout the library. It wraps
/// destination-specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum MeridianError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Caller-contract violations (no I/O was attempted)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Canonical resource store errors
    #[error("Resource store error: {0}")]
    Store(#[from] StoreError),

    /// Data-lake (object store) errors
    #[error("Data lake error: {0}")]
    Lake(#[from] LakeError),

    /// Event broker errors
    #[error("Event broker error: {0}")]
    Broker(#[from] BrokerError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Canonical resource store errors
///
/// Errors that occur when interacting with the system of record. These
/// errors don't expose the underlying wire client's types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to connect to the resource store
    #[error("Failed to connect to resource store: {0}")]
    ConnectionFailed(String),

    /// The requested resource does not exist
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// A write was not accepted
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// A delete was not accepted
    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    /// A read query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Server error (5xx-equivalent)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx-equivalent)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Request timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

/// Data-lake (object store) errors
#[derive(Debug, Error)]
pub enum LakeError {
    /// Failed to connect to the object store
    #[error("Failed to connect to object store: {0}")]
    ConnectionFailed(String),

    /// An upload was not accepted
    #[error("Upload failed for {path}: {message}")]
    UploadFailed { path: String, message: String },

    /// Request timeout
    #[error("Upload timeout: {0}")]
    Timeout(String),
}

/// Event broker errors
#[derive(Debug, Error)]
pub enum BrokerError {
    /// Failed to connect to the broker
    #[error("Failed to connect to broker: {0}")]
    ConnectionFailed(String),

    /// Failed to construct a sender for a channel
    #[error("Failed to create sender for channel {channel}: {message}")]
    SenderCreationFailed { channel: String, message: String },

    /// A send was not accepted
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// The event payload could not be serialized
    #[error("Event serialization failed: {0}")]
    SerializationFailed(String),

    /// Request timeout
    #[error("Send timeout: {0}")]
    Timeout(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for MeridianError {
    fn from(err: std::io::Error) -> Self {
        MeridianError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for MeridianError {
    fn from(err: serde_json::Error) -> Self {
        MeridianError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for MeridianError {
    fn from(err: toml::de::Error) -> Self {
        MeridianError::Configuration(format!("TOML parse error: {err}"))
    }
}
