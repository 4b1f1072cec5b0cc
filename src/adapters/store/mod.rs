//! Canonical resource store adapter contract
//!
//! The system of record owns authoritative identity and modification-kind
//! classification. The wire-level client (HTTP/GraphQL) lives outside this
//! crate; the pipeline only consumes the verbs defined here and classifies
//! their failures.

use crate::domain::ids::{RecordKey, ResourceType, TenantId};
use crate::domain::outcome::StoredRecord;
use crate::domain::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Per-record results of an accepted batch write
#[derive(Debug, Clone, Default)]
pub struct StoreWriteResponse {
    /// Records the store accepted, with modification kind
    pub succeeded: Vec<StoredRecord>,
    /// Records the store did not accept, with error messages
    pub failed: Vec<StoreRecordFailure>,
}

impl StoreWriteResponse {
    /// Creates an empty response
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges another response into this one, preserving order
    pub fn merge(&mut self, other: StoreWriteResponse) {
        self.succeeded.extend(other.succeeded);
        self.failed.extend(other.failed);
    }
}

/// A record the store did not accept
#[derive(Debug, Clone)]
pub struct StoreRecordFailure {
    /// Identity of the failed record
    pub key: RecordKey,
    /// Error message reported by the store
    pub message: String,
}

/// Tagged outcome of a batch write call
///
/// The adapter classifies wire-level failures into explicit variants so the
/// orchestrator can pattern-match instead of inspecting caught exceptions.
/// `Applied` means the call itself completed; individual records may still
/// have failed inside the response.
#[derive(Debug, Clone)]
pub enum StoreWriteOutcome {
    /// The write call completed; per-record results are inside
    Applied(StoreWriteResponse),
    /// The store answered with a redirect-style response (3xx-equivalent)
    RedirectLike(String),
    /// The store refused the request (4xx-equivalent)
    ClientLike(String),
    /// The store failed to process the request (5xx-equivalent)
    ServerLike(String),
}

/// Client for the canonical resource store
///
/// Implementations wrap the wire-level client and must classify failures,
/// never panic or leak transport types.
#[async_trait]
pub trait ResourceStoreClient: Send + Sync {
    /// Writes a set of records in one logical call
    ///
    /// The adapter may chunk internally; the returned outcome covers every
    /// record passed in.
    ///
    /// # Errors
    ///
    /// Returns an error only when the call could not be attempted at all
    /// (e.g. connection failure). Wire-level rejections are reported through
    /// [`StoreWriteOutcome`].
    async fn add_resources(
        &self,
        tenant: &TenantId,
        records: &[crate::domain::record::Record],
    ) -> Result<StoreWriteOutcome>;

    /// Fetches the current content of a resource
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(content))` if found, `Ok(None)` if the resource
    /// does not exist.
    async fn get_resource(&self, resource_type: &ResourceType, id: &str) -> Result<Option<Value>>;

    /// Deletes a resource
    ///
    /// # Errors
    ///
    /// Returns an error if the delete was not accepted.
    async fn delete_resource(&self, resource_type: &ResourceType, id: &str) -> Result<()>;
}
