//! Event broker adapter contract and sender cache
//!
//! The broker wire client is an external collaborator; the pipeline needs a
//! sender bound to a channel name plus a factory to construct one. Senders
//! are cached per channel and reused across `publish` calls, never recreated
//! per call.

pub mod cache;

pub use cache::SenderCache;

use crate::domain::event::EventEnvelope;
use crate::domain::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// A sender bound to one broker channel
#[async_trait]
pub trait EventSender: Send + Sync {
    /// Sends one event to the bound channel
    ///
    /// # Errors
    ///
    /// Returns an error if the broker did not accept the event.
    async fn send(&self, event: &EventEnvelope) -> Result<()>;
}

/// Constructs senders for channels on demand
///
/// Implementations wrap the broker client's producer construction. The
/// factory is only consulted on a cache miss in [`SenderCache`].
pub trait SenderFactory: Send + Sync {
    /// Creates a sender bound to the given channel
    ///
    /// # Errors
    ///
    /// Returns an error if the sender could not be constructed.
    fn create(&self, channel: &str) -> Result<Arc<dyn EventSender>>;
}
