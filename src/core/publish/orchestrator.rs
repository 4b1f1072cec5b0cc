//! Publication orchestrator
//!
//! Fans a batch of records out to the canonical store, the data lake, and
//! the event bus, and reduces all per-destination outcomes into one
//! response. Stages run sequentially (store, then lake, then bus); work
//! fans out concurrently inside each stage through the chunked dispatcher.

use crate::adapters::lake::{LakePathBuilder, ObjectStoreClient};
use crate::adapters::store::{ResourceStoreClient, StoreWriteOutcome};
use crate::config::MeridianConfig;
use crate::core::change::ChangeDetector;
use crate::core::dispatch::{dispatch_chunks, dispatch_each, split_chunks, DispatchConfig, DispatchOutcome};
use crate::core::route::EventPublisher;
use crate::domain::ids::{RecordKey, ResourceType, TenantId};
use crate::domain::outcome::{PublishError, PublishResponse, RecordFailure, StoredRecord};
use crate::domain::record::{Batch, ModificationKind, Record, Trigger};
use crate::domain::Result;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// Tuning for the orchestrator, derived from configuration
#[derive(Debug, Clone)]
pub struct PublisherSettings {
    /// Dispatch tuning for canonical-store batch upserts
    pub store_dispatch: DispatchConfig,
    /// Dispatch tuning for per-record lake uploads
    pub lake_dispatch: DispatchConfig,
    /// Data-lake path layout
    pub lake_paths: LakePathBuilder,
    /// When true, lake uploads are detached and not awaited. At-most-once:
    /// upload outcomes are logged but absent from the response.
    pub fire_and_forget: bool,
}

impl Default for PublisherSettings {
    fn default() -> Self {
        Self {
            store_dispatch: DispatchConfig::default(),
            lake_dispatch: DispatchConfig {
                chunk_size: 1,
                ..DispatchConfig::default()
            },
            lake_paths: LakePathBuilder::new("lake"),
            fire_and_forget: false,
        }
    }
}

impl PublisherSettings {
    /// Builds settings from the loaded configuration
    pub fn from_config(config: &MeridianConfig) -> Self {
        Self {
            store_dispatch: DispatchConfig {
                chunk_size: config.store.chunk_size,
                task_timeout: Duration::from_secs(config.store.task_timeout_seconds),
                max_concurrency: config.store.max_concurrency,
            },
            lake_dispatch: DispatchConfig {
                chunk_size: 1,
                task_timeout: Duration::from_secs(config.lake.task_timeout_seconds),
                max_concurrency: config.lake.max_concurrency,
            },
            lake_paths: LakePathBuilder::new(&config.lake.root),
            fire_and_forget: config.lake.fire_and_forget,
        }
    }
}

/// Orchestrates publication of record batches to all destinations
pub struct Publisher {
    store: Arc<dyn ResourceStoreClient>,
    lake: Arc<dyn ObjectStoreClient>,
    events: Arc<EventPublisher>,
    detector: Arc<ChangeDetector>,
    settings: PublisherSettings,
}

impl Publisher {
    /// Creates a publisher over the given destination adapters
    ///
    /// The change detector and the event publisher's sender cache are owned
    /// here; concurrent `publish` calls share them safely.
    pub fn new(
        store: Arc<dyn ResourceStoreClient>,
        lake: Arc<dyn ObjectStoreClient>,
        events: Arc<EventPublisher>,
        settings: PublisherSettings,
    ) -> Self {
        let detector = Arc::new(ChangeDetector::new(Arc::clone(&store)));
        Self {
            store,
            lake,
            events,
            detector,
            settings,
        }
    }

    /// Publishes a batch of records to all destinations
    ///
    /// Records with an empty id are rejected before any I/O. All valid
    /// records go to the canonical store; store-accepted records that
    /// actually changed go to the data lake; all store-accepted records get
    /// an event when a trigger is supplied. Failures never abort sibling
    /// records; the response enumerates exactly which records failed at
    /// which stage.
    pub async fn publish(
        &self,
        tenant: &TenantId,
        records: Vec<Record>,
        trigger: Option<Trigger>,
    ) -> PublishResponse {
        let mut response = PublishResponse::new();

        if records.is_empty() {
            tracing::debug!(tenant = %tenant, "Empty batch, nothing to publish");
            return response;
        }

        tracing::info!(
            tenant = %tenant,
            batch_size = records.len(),
            trigger = trigger.map(|t| t.path_segment()),
            "Publishing batch"
        );

        // Caller contract: every record needs an id. No network calls are
        // attributable to a rejected record.
        let mut valid = Vec::with_capacity(records.len());
        for record in records {
            if record.has_id() {
                valid.push(record);
            } else {
                response.rejected.push(RecordFailure::rejection(
                    record.key(),
                    "Record id must not be empty",
                ));
            }
        }

        if valid.is_empty() {
            response.log_summary();
            return response;
        }

        // Change detection gates the lake only; the store remains the
        // authority on modification kind.
        let changed: HashSet<(String, String)> = self
            .detector
            .filter_changed(&valid)
            .await
            .iter()
            .map(|r| r.key().canonical())
            .collect();

        let by_key: HashMap<(String, String), Record> = valid
            .iter()
            .map(|r| (r.key().canonical(), r.clone()))
            .collect();

        let accepted = self.write_to_store(tenant, valid, &mut response).await;
        response.stored = accepted.clone();

        if accepted.is_empty() {
            response.log_summary();
            return response;
        }

        let lake_candidates: Vec<Record> = accepted
            .iter()
            .filter(|s| s.kind != ModificationKind::Unmodified)
            .filter(|s| changed.contains(&s.key.canonical()))
            .filter_map(|s| by_key.get(&s.key.canonical()).cloned())
            .collect();
        if !lake_candidates.is_empty() {
            self.publish_to_lake(tenant, trigger, lake_candidates, &mut response)
                .await;
        }

        // Event policy is independent of lake policy: unmodified records
        // still notify, and no trigger means store-for-durability only.
        if let Some(trigger) = trigger {
            let event_records: Vec<Record> = accepted
                .iter()
                .filter_map(|s| by_key.get(&s.key.canonical()).cloned())
                .collect();
            let push = self
                .events
                .publish_events(tenant, trigger, &event_records)
                .await;
            response.events_sent = push.sent;
            response.event_failures.extend(push.failures);
        }

        response.log_summary();
        response
    }

    /// Publishes a pre-assembled batch
    pub async fn publish_batch(&self, batch: Batch) -> PublishResponse {
        self.publish(&batch.tenant.clone(), batch.records, batch.trigger)
            .await
    }

    /// Publishes and fails fast when any record failed anywhere
    ///
    /// The error carries the full response, so per-record status remains
    /// recoverable.
    pub async fn publish_or_fail(
        &self,
        tenant: &TenantId,
        records: Vec<Record>,
        trigger: Option<Trigger>,
    ) -> std::result::Result<PublishResponse, PublishError> {
        self.publish(tenant, records, trigger).await.into_result()
    }

    /// Removes a record from the canonical store and drops its cached
    /// fingerprint, so a later re-publish is always treated as changed
    pub async fn retract(&self, resource_type: &ResourceType, id: &str) -> Result<()> {
        self.store.delete_resource(resource_type, id).await?;
        self.detector.forget(resource_type.as_str(), id);
        tracing::info!(resource_type = %resource_type, id = id, "Record retracted");
        Ok(())
    }

    /// One logical store write, internally chunked and dispatched with
    /// bounded concurrency
    async fn write_to_store(
        &self,
        tenant: &TenantId,
        valid: Vec<Record>,
        response: &mut PublishResponse,
    ) -> Vec<StoredRecord> {
        let chunk_keys = split_chunks(
            valid.iter().map(Record::key).collect(),
            self.settings.store_dispatch.chunk_size,
        );

        let store = Arc::clone(&self.store);
        let tenant_owned = tenant.clone();
        let outcomes = dispatch_chunks(valid, &self.settings.store_dispatch, move |chunk| {
            let store = Arc::clone(&store);
            let tenant = tenant_owned.clone();
            async move { store.add_resources(&tenant, &chunk).await }
        })
        .await;

        let mut accepted = Vec::new();
        for (outcome, keys) in outcomes.into_iter().zip(&chunk_keys) {
            match outcome {
                DispatchOutcome::Completed(Ok(StoreWriteOutcome::Applied(write))) => {
                    accepted.extend(write.succeeded);
                    for failure in write.failed {
                        response
                            .store_failures
                            .push(RecordFailure::destination(failure.key, failure.message));
                    }
                }
                DispatchOutcome::Completed(Ok(StoreWriteOutcome::RedirectLike(m))) => {
                    fail_chunk(
                        &mut response.store_failures,
                        keys,
                        &format!("Store redirected the write: {m}"),
                    );
                }
                DispatchOutcome::Completed(Ok(StoreWriteOutcome::ClientLike(m))) => {
                    fail_chunk(
                        &mut response.store_failures,
                        keys,
                        &format!("Store refused the write: {m}"),
                    );
                }
                DispatchOutcome::Completed(Ok(StoreWriteOutcome::ServerLike(m))) => {
                    fail_chunk(
                        &mut response.store_failures,
                        keys,
                        &format!("Store failed to process the write: {m}"),
                    );
                }
                DispatchOutcome::Completed(Err(e)) => {
                    fail_chunk(&mut response.store_failures, keys, &e.to_string());
                }
                DispatchOutcome::TimedOut => {
                    fail_chunk(&mut response.store_failures, keys, "Store write timed out");
                }
                DispatchOutcome::Failed(m) => {
                    fail_chunk(&mut response.store_failures, keys, &m);
                }
            }
        }
        accepted
    }

    /// Per-record lake uploads; blocking with bounded concurrency by
    /// default, detached when `fire_and_forget` is set
    async fn publish_to_lake(
        &self,
        tenant: &TenantId,
        trigger: Option<Trigger>,
        candidates: Vec<Record>,
        response: &mut PublishResponse,
    ) {
        let mut uploads = Vec::with_capacity(candidates.len());
        for record in &candidates {
            let key = record.key();
            let path = self.settings.lake_paths.path_for_today(tenant, trigger, record);
            match serde_json::to_vec(&record.content) {
                Ok(bytes) => uploads.push((key, path, bytes)),
                Err(e) => {
                    response
                        .lake_failures
                        .push(RecordFailure::destination(key, e.to_string()));
                }
            }
        }

        if self.settings.fire_and_forget {
            for (key, path, bytes) in uploads {
                let lake = Arc::clone(&self.lake);
                tokio::spawn(async move {
                    if let Err(e) = lake.upload(&path, &bytes).await {
                        tracing::error!(key = %key, path = path, error = %e, "Detached lake upload failed");
                    }
                });
            }
            return;
        }

        let keys: Vec<RecordKey> = uploads.iter().map(|(key, _, _)| key.clone()).collect();
        let lake = Arc::clone(&self.lake);
        let outcomes = dispatch_each(uploads, &self.settings.lake_dispatch, move |(_, path, bytes)| {
            let lake = Arc::clone(&lake);
            async move { lake.upload(&path, &bytes).await }
        })
        .await;

        for (outcome, key) in outcomes.into_iter().zip(keys) {
            match outcome {
                DispatchOutcome::Completed(Ok(())) => response.lake_published.push(key),
                DispatchOutcome::Completed(Err(e)) => {
                    response
                        .lake_failures
                        .push(RecordFailure::destination(key, e.to_string()));
                }
                DispatchOutcome::TimedOut => {
                    response
                        .lake_failures
                        .push(RecordFailure::destination(key, "Lake upload timed out"));
                }
                DispatchOutcome::Failed(m) => {
                    response
                        .lake_failures
                        .push(RecordFailure::destination(key, m));
                }
            }
        }
    }
}

fn fail_chunk(failures: &mut Vec<RecordFailure>, keys: &[RecordKey], message: &str) {
    for key in keys {
        failures.push(RecordFailure::destination(key.clone(), message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = PublisherSettings::default();
        assert_eq!(settings.store_dispatch.chunk_size, 25);
        assert_eq!(settings.lake_dispatch.chunk_size, 1);
        assert!(!settings.fire_and_forget);
    }

    #[test]
    fn test_fail_chunk_expands_per_record() {
        let keys = vec![
            RecordKey::new(ResourceType::new("Patient").unwrap(), "1"),
            RecordKey::new(ResourceType::new("Patient").unwrap(), "2"),
        ];
        let mut failures = Vec::new();
        fail_chunk(&mut failures, &keys, "store unavailable");
        assert_eq!(failures.len(), 2);
        assert!(failures.iter().all(|f| f.message == "store unavailable"));
    }
}
