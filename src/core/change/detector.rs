//! Change detection cache
//!
//! Decides whether a record needs to be (re)written to the data lake. The
//! cache maps `type -> (id -> last fingerprint)` and is a performance
//! optimization, never authoritative: a cold cache causes extra writes, a
//! hash match is confirmed by a deep comparison against the canonical
//! store's normalized prior content before a record is skipped.
//!
//! Policy when the deep-comparison fetch fails: the record is assumed
//! changed and re-written. An extra write is safe; silently skipping on a
//! fetch error could hide data.

use crate::adapters::store::ResourceStoreClient;
use crate::core::change::fingerprint::{content_fingerprint, structurally_equal};
use crate::domain::record::Record;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Filters a batch down to the records whose content actually changed
pub struct ChangeDetector {
    store: Arc<dyn ResourceStoreClient>,
    fingerprints: Mutex<HashMap<String, HashMap<String, String>>>,
}

impl ChangeDetector {
    /// Creates a detector with an empty cache
    pub fn new(store: Arc<dyn ResourceStoreClient>) -> Self {
        Self {
            store,
            fingerprints: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the subset of `records` considered changed, in input order
    ///
    /// A record is excluded only when its fingerprint matches the cached one
    /// AND a deep comparison against the store's normalized prior content
    /// confirms there is no difference. Everything else is included and the
    /// cache updated to the new fingerprint.
    pub async fn filter_changed(&self, records: &[Record]) -> Vec<Record> {
        let mut changed = Vec::new();

        for record in records {
            if self.is_changed(record).await {
                changed.push(record.clone());
            }
        }

        tracing::debug!(
            candidates = records.len(),
            changed = changed.len(),
            "Change detection completed"
        );

        changed
    }

    /// Drops the cached fingerprint for a record, forcing the next
    /// publication of it to be treated as changed
    pub fn forget(&self, resource_type: &str, id: &str) {
        let mut cache = self
            .fingerprints
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(by_id) = cache.get_mut(&resource_type.to_lowercase()) {
            by_id.remove(id);
        }
    }

    async fn is_changed(&self, record: &Record) -> bool {
        let fingerprint = match content_fingerprint(&record.content) {
            Ok(fp) => fp,
            Err(e) => {
                tracing::warn!(
                    key = %record.key(),
                    error = %e,
                    "Failed to fingerprint record content, assuming changed"
                );
                return true;
            }
        };

        if self.cached(record) == Some(fingerprint.clone()) {
            // Hash match: confirm with a deep comparison so a collision or a
            // cache populated by a differently-normalizing writer cannot
            // cause a stale skip.
            return self.deep_check(record).await;
        }

        self.remember(record, fingerprint);
        true
    }

    /// Confirms an apparent no-op against the store's prior content.
    /// Returns true when the record must still be treated as changed.
    async fn deep_check(&self, record: &Record) -> bool {
        match self
            .store
            .get_resource(&record.resource_type, &record.id)
            .await
        {
            Ok(Some(prior)) => {
                if structurally_equal(&prior, &record.content) {
                    tracing::debug!(key = %record.key(), "Record unchanged, skipping");
                    false
                } else {
                    tracing::debug!(
                        key = %record.key(),
                        "Fingerprint matched but content differs, treating as changed"
                    );
                    true
                }
            }
            Ok(None) => {
                tracing::debug!(
                    key = %record.key(),
                    "No prior content in store, treating as changed"
                );
                true
            }
            Err(e) => {
                tracing::warn!(
                    key = %record.key(),
                    error = %e,
                    "Failed to fetch prior content for comparison, assuming changed"
                );
                true
            }
        }
    }

    fn cached(&self, record: &Record) -> Option<String> {
        let cache = self
            .fingerprints
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cache
            .get(&record.resource_type.canonical())
            .and_then(|by_id| by_id.get(&record.id))
            .cloned()
    }

    fn remember(&self, record: &Record, fingerprint: String) {
        let mut cache = self
            .fingerprints
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cache
            .entry(record.resource_type.canonical())
            .or_default()
            .insert(record.id.clone(), fingerprint);
    }
}
