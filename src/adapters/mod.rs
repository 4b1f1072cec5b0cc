//! External destination adapters
//!
//! Thin contracts for the three destinations the pipeline fans out to:
//! the canonical resource store, the data-lake object store, and the event
//! broker. Wire-level clients implement these traits outside the core.

pub mod broker;
pub mod lake;
pub mod store;

pub use broker::{EventSender, SenderCache, SenderFactory};
pub use lake::{LakePathBuilder, ObjectStoreClient};
pub use store::{ResourceStoreClient, StoreRecordFailure, StoreWriteOutcome, StoreWriteResponse};
