//! Shared in-memory test doubles for the destination adapters

// Not every test binary uses every helper.
#![allow(dead_code)]

use async_trait::async_trait;
use meridian::adapters::broker::{EventSender, SenderCache, SenderFactory};
use meridian::adapters::lake::ObjectStoreClient;
use meridian::adapters::store::{
    ResourceStoreClient, StoreRecordFailure, StoreWriteOutcome, StoreWriteResponse,
};
use meridian::core::publish::{Publisher, PublisherSettings};
use meridian::core::route::{identity_converter, EventPublisher, Topic, TopicRegistry};
use meridian::domain::event::EventEnvelope;
use meridian::domain::ids::{RecordKey, ResourceType, TenantId};
use meridian::domain::outcome::StoredRecord;
use meridian::domain::record::{ModificationKind, Record};
use meridian::domain::{MeridianError, Result, StoreError};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Stateful upsert store: classifies writes as created/updated/unmodified
/// from its own contents, like the real canonical store would.
#[derive(Default)]
pub struct MemoryStore {
    resources: Mutex<HashMap<(String, String), Value>>,
    pub add_calls: AtomicUsize,
    pub added_ids: Mutex<Vec<String>>,
    pub fail_ids: Mutex<HashSet<String>>,
    pub outcome_override: Mutex<Option<StoreWriteOutcome>>,
    pub fail_gets: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_id(&self, id: &str) {
        self.fail_ids.lock().unwrap().insert(id.to_string());
    }

    pub fn contains(&self, resource_type: &str, id: &str) -> bool {
        self.resources
            .lock()
            .unwrap()
            .contains_key(&(resource_type.to_string(), id.to_string()))
    }
}

#[async_trait]
impl ResourceStoreClient for MemoryStore {
    async fn add_resources(
        &self,
        _tenant: &TenantId,
        records: &[Record],
    ) -> Result<StoreWriteOutcome> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        {
            let mut added = self.added_ids.lock().unwrap();
            added.extend(records.iter().map(|r| r.id.clone()));
        }

        if let Some(outcome) = self.outcome_override.lock().unwrap().clone() {
            return Ok(outcome);
        }

        let mut response = StoreWriteResponse::new();
        let fail_ids = self.fail_ids.lock().unwrap().clone();
        let mut resources = self.resources.lock().unwrap();

        for record in records {
            let key = record.key();
            if fail_ids.contains(&record.id) {
                response.failed.push(StoreRecordFailure {
                    key,
                    message: "store rejected record".to_string(),
                });
                continue;
            }

            let slot = (record.resource_type.as_str().to_string(), record.id.clone());
            let kind = match resources.get(&slot) {
                None => ModificationKind::Created,
                Some(existing) if *existing == record.content => ModificationKind::Unmodified,
                Some(_) => ModificationKind::Updated,
            };
            resources.insert(slot, record.content.clone());
            response.succeeded.push(StoredRecord::new(key, kind));
        }

        Ok(StoreWriteOutcome::Applied(response))
    }

    async fn get_resource(&self, resource_type: &ResourceType, id: &str) -> Result<Option<Value>> {
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(MeridianError::Store(StoreError::QueryFailed(
                "connection reset".to_string(),
            )));
        }
        Ok(self
            .resources
            .lock()
            .unwrap()
            .get(&(resource_type.as_str().to_string(), id.to_string()))
            .cloned())
    }

    async fn delete_resource(&self, resource_type: &ResourceType, id: &str) -> Result<()> {
        self.resources
            .lock()
            .unwrap()
            .remove(&(resource_type.as_str().to_string(), id.to_string()));
        Ok(())
    }
}

/// Object store double recording upload paths.
#[derive(Default)]
pub struct MemoryLake {
    pub uploads: Mutex<Vec<String>>,
    pub fail_paths_containing: Mutex<Option<String>>,
}

impl MemoryLake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStoreClient for MemoryLake {
    async fn upload(&self, path: &str, _content: &[u8]) -> Result<()> {
        if let Some(marker) = self.fail_paths_containing.lock().unwrap().as_deref() {
            if path.contains(marker) {
                return Err(MeridianError::Lake(meridian::domain::LakeError::UploadFailed {
                    path: path.to_string(),
                    message: "upload refused".to_string(),
                }));
            }
        }
        self.uploads.lock().unwrap().push(path.to_string());
        Ok(())
    }
}

pub struct MemorySender {
    sent: Arc<Mutex<Vec<EventEnvelope>>>,
    fail_sends: Arc<AtomicBool>,
}

#[async_trait]
impl EventSender for MemorySender {
    async fn send(&self, event: &EventEnvelope) -> Result<()> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(MeridianError::Broker(
                meridian::domain::BrokerError::SendFailed("broker unavailable".to_string()),
            ));
        }
        self.sent.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Sender factory counting constructions, one shared event log.
pub struct MemoryBroker {
    pub created: AtomicUsize,
    pub sent: Arc<Mutex<Vec<EventEnvelope>>>,
    pub fail_sends: Arc<AtomicBool>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self {
            created: AtomicUsize::new(0),
            sent: Arc::new(Mutex::new(Vec::new())),
            fail_sends: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl SenderFactory for MemoryBroker {
    fn create(&self, _channel: &str) -> Result<Arc<dyn EventSender>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MemorySender {
            sent: Arc::clone(&self.sent),
            fail_sends: Arc::clone(&self.fail_sends),
        }))
    }
}

/// Handles to the doubles behind a publisher under test.
pub struct Fixture {
    pub publisher: Publisher,
    pub store: Arc<MemoryStore>,
    pub lake: Arc<MemoryLake>,
    pub broker: Arc<MemoryBroker>,
}

/// Topics for the Patient and Observation types, any trigger.
pub fn default_registry() -> TopicRegistry {
    TopicRegistry::new()
        .register(Topic::new(
            "Patient",
            "patient-events",
            "clinical.patient",
            identity_converter(),
        ))
        .register(Topic::new(
            "Observation",
            "observation-events",
            "clinical.observation",
            identity_converter(),
        ))
}

pub fn fixture() -> Fixture {
    fixture_with(default_registry(), PublisherSettings::default())
}

pub fn fixture_with(registry: TopicRegistry, settings: PublisherSettings) -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let lake = Arc::new(MemoryLake::new());
    let broker = Arc::new(MemoryBroker::new());
    let events = Arc::new(EventPublisher::new(
        registry,
        SenderCache::new(broker.clone()),
    ));
    let publisher = Publisher::new(store.clone(), lake.clone(), events, settings);
    Fixture {
        publisher,
        store,
        lake,
        broker,
    }
}

pub fn tenant() -> TenantId {
    TenantId::new("mdaoc").unwrap()
}

pub fn record(resource_type: &str, id: &str, content: Value) -> Record {
    Record::new(ResourceType::new(resource_type).unwrap(), id, content)
}

pub fn key(resource_type: &str, id: &str) -> RecordKey {
    RecordKey::new(ResourceType::new(resource_type).unwrap(), id)
}
