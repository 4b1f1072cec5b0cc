//! Per-record publication outcomes
//!
//! Every pipeline stage produces per-record results; the orchestrator
//! reduces them into a single [`PublishResponse`] keyed by record identity.
//! Failures are kept in separate lists per destination so a caller can
//! always tell which records failed at which stage.

use crate::domain::ids::RecordKey;
use crate::domain::record::ModificationKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a record-level failure occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// Caller-contract violation; no I/O was attempted for the record
    Rejection,
    /// A destination call was attempted and failed
    Destination,
    /// Topic routing configuration was invalid; nothing was tried
    Configuration,
}

/// A single record-level failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordFailure {
    /// Identity of the failed record
    pub key: RecordKey,
    /// Human-readable error message
    pub message: String,
    /// Failure classification
    pub kind: FailureKind,
}

impl RecordFailure {
    /// Creates a rejection failure (caller contract violation)
    pub fn rejection(key: RecordKey, message: impl Into<String>) -> Self {
        Self {
            key,
            message: message.into(),
            kind: FailureKind::Rejection,
        }
    }

    /// Creates a destination failure (the call was tried and failed)
    pub fn destination(key: RecordKey, message: impl Into<String>) -> Self {
        Self {
            key,
            message: message.into(),
            kind: FailureKind::Destination,
        }
    }

    /// Creates a configuration failure (nothing was tried)
    pub fn configuration(key: RecordKey, message: impl Into<String>) -> Self {
        Self {
            key,
            message: message.into(),
            kind: FailureKind::Configuration,
        }
    }
}

/// A record accepted by the canonical store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Identity of the stored record
    pub key: RecordKey,
    /// How the store classified the write
    pub kind: ModificationKind,
}

impl StoredRecord {
    /// Creates a new stored-record entry
    pub fn new(key: RecordKey, kind: ModificationKind) -> Self {
        Self { key, kind }
    }
}

/// Outcome of event publication for a set of records
#[derive(Debug, Clone, Default)]
pub struct PushResponse {
    /// Records whose event was accepted by the broker
    pub sent: Vec<RecordKey>,
    /// Records whose event failed (configuration or send error)
    pub failures: Vec<RecordFailure>,
}

impl PushResponse {
    /// Creates an empty push response
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether every record's event was accepted
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Aggregated outcome of publishing one batch to all destinations
///
/// Records that succeeded at the canonical store remain durable even if
/// data-lake or event publication failed for them; the separate lists make
/// that distinction recoverable.
#[derive(Debug, Clone, Default)]
pub struct PublishResponse {
    /// Records accepted by the canonical store, with modification kind
    pub stored: Vec<StoredRecord>,
    /// Records uploaded to the data lake
    pub lake_published: Vec<RecordKey>,
    /// Records whose event was accepted by the broker
    pub events_sent: Vec<RecordKey>,
    /// Records rejected before any I/O (caller contract violations)
    pub rejected: Vec<RecordFailure>,
    /// Records the canonical store did not accept
    pub store_failures: Vec<RecordFailure>,
    /// Store-accepted records whose lake upload failed
    pub lake_failures: Vec<RecordFailure>,
    /// Store-accepted records whose event emission failed
    pub event_failures: Vec<RecordFailure>,
}

impl PublishResponse {
    /// Creates an empty response
    pub fn new() -> Self {
        Self::default()
    }

    /// Identities of records accepted by the canonical store
    pub fn successful_ids(&self) -> Vec<RecordKey> {
        self.stored.iter().map(|s| s.key.clone()).collect()
    }

    /// Identities of records that never made it into the store
    /// (rejections plus store failures)
    pub fn failed_ids(&self) -> Vec<RecordKey> {
        self.rejected
            .iter()
            .chain(self.store_failures.iter())
            .map(|f| f.key.clone())
            .collect()
    }

    /// Whether any stage reported any failure
    pub fn has_failures(&self) -> bool {
        !self.rejected.is_empty()
            || !self.store_failures.is_empty()
            || !self.lake_failures.is_empty()
            || !self.event_failures.is_empty()
    }

    /// Whether every record fully succeeded everywhere it was routed
    pub fn is_success(&self) -> bool {
        !self.has_failures()
    }

    /// Converts the response into a `Result` for callers that prefer
    /// fail-fast semantics
    ///
    /// The returned [`PublishError`] carries the full response, so which
    /// records succeeded where is still recoverable from the error path.
    pub fn into_result(self) -> Result<Self, PublishError> {
        if self.has_failures() {
            Err(PublishError { response: self })
        } else {
            Ok(self)
        }
    }

    /// Emits a one-line structured summary of the response
    pub fn log_summary(&self) {
        tracing::info!(
            stored = self.stored.len(),
            lake_published = self.lake_published.len(),
            events_sent = self.events_sent.len(),
            rejected = self.rejected.len(),
            store_failures = self.store_failures.len(),
            lake_failures = self.lake_failures.len(),
            event_failures = self.event_failures.len(),
            "Publication completed"
        );
    }
}

/// Aggregate error raised when a caller wants fail-fast semantics
///
/// Carries the full [`PublishResponse`] so per-record status across
/// destinations is not lost on the error path.
#[derive(Debug, Error)]
#[error(
    "Publication failed: {} rejected, {} store failure(s), {} lake failure(s), {} event failure(s)",
    .response.rejected.len(),
    .response.store_failures.len(),
    .response.lake_failures.len(),
    .response.event_failures.len()
)]
pub struct PublishError {
    /// The full per-record outcome
    pub response: PublishResponse,
}
