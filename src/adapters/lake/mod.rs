//! Data-lake (object store) adapter contract and path layout
//!
//! The lake is an append-mostly, partitioned object store written only for
//! actually-changed records. The upload client itself is an external
//! collaborator; this module defines the verb the pipeline needs plus the
//! deterministic path convention used for downstream partitioning.

pub mod path;

pub use path::LakePathBuilder;

use crate::domain::Result;
use async_trait::async_trait;

/// Client for the data-lake object store
#[async_trait]
pub trait ObjectStoreClient: Send + Sync {
    /// Uploads one object
    ///
    /// # Arguments
    ///
    /// * `path` - Destination path, see [`LakePathBuilder`]
    /// * `content` - Raw object bytes
    ///
    /// # Errors
    ///
    /// Returns an error if the upload was not accepted.
    async fn upload(&self, path: &str, content: &[u8]) -> Result<()>;
}
