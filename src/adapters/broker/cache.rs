//! Per-channel sender cache
//!
//! One sender per channel name, created lazily and reused for the lifetime
//! of the process. Get-or-create is atomic under a single lock so concurrent
//! `publish` calls never construct duplicate senders.

use crate::adapters::broker::{EventSender, SenderFactory};
use crate::domain::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Cache of channel-bound senders
pub struct SenderCache {
    factory: Arc<dyn SenderFactory>,
    senders: Mutex<HashMap<String, Arc<dyn EventSender>>>,
}

impl SenderCache {
    /// Creates an empty cache backed by the given factory
    pub fn new(factory: Arc<dyn SenderFactory>) -> Self {
        Self {
            factory,
            senders: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the sender for a channel, constructing it on first use
    ///
    /// Construction happens under the cache lock; a failed construction is
    /// not cached, so a later call retries.
    ///
    /// # Errors
    ///
    /// Returns an error if the factory could not construct the sender.
    pub fn get_or_create(&self, channel: &str) -> Result<Arc<dyn EventSender>> {
        let mut senders = self
            .senders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(sender) = senders.get(channel) {
            return Ok(Arc::clone(sender));
        }

        tracing::debug!(channel = channel, "Creating sender for channel");
        let sender = self.factory.create(channel)?;
        senders.insert(channel.to_string(), Arc::clone(&sender));
        Ok(sender)
    }

    /// Number of cached senders
    pub fn len(&self) -> usize {
        self.senders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
