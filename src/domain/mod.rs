//! Core domain types and models
//!
//! This module contains the record and identity types, the event envelope,
//! per-record outcome types, and the error hierarchy used throughout the
//! publication pipeline.

pub mod errors;
pub mod event;
pub mod ids;
pub mod outcome;
pub mod record;
pub mod result;

// Re-export commonly used types
pub use errors::{BrokerError, LakeError, MeridianError, StoreError};
pub use event::EventEnvelope;
pub use ids::{RecordKey, ResourceType, TenantId};
pub use outcome::{
    FailureKind, PublishError, PublishResponse, PushResponse, RecordFailure, StoredRecord,
};
pub use record::{Batch, ModificationKind, Record, Trigger};
pub use result::Result;
