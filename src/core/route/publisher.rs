//! Topic-routed event publication
//!
//! Groups records by type, resolves the unique topic for each group, and
//! emits one event per record through a cached per-channel sender. Outcomes
//! are always record-level: a failure that hits a whole group is expanded
//! into one failure entry per record.

use crate::adapters::broker::SenderCache;
use crate::core::route::topic::{TopicMatch, TopicRegistry};
use crate::domain::ids::TenantId;
use crate::domain::outcome::{PushResponse, RecordFailure};
use crate::domain::record::{Record, Trigger};
use futures::future::join_all;

/// Emits events for published records, one per record
pub struct EventPublisher {
    registry: TopicRegistry,
    senders: SenderCache,
}

impl EventPublisher {
    /// Creates a publisher over the given topics and sender cache
    pub fn new(registry: TopicRegistry, senders: SenderCache) -> Self {
        Self { registry, senders }
    }

    /// Publishes one event per record to the record type's topic
    ///
    /// Records of types with zero or multiple matching topics are reported
    /// as configuration failures without any broker call. Send failures are
    /// per-record destination failures; sibling groups are unaffected.
    pub async fn publish_events(
        &self,
        tenant: &TenantId,
        trigger: Trigger,
        records: &[Record],
    ) -> PushResponse {
        let mut response = PushResponse::new();

        for (type_lower, group) in group_by_type(records) {
            match self.registry.lookup(&type_lower, trigger) {
                TopicMatch::None => {
                    tracing::warn!(
                        resource_type = %type_lower,
                        trigger = %trigger,
                        "No topic registered, failing group"
                    );
                    for record in group {
                        response.failures.push(RecordFailure::configuration(
                            record.key(),
                            format!("No topic registered for type {type_lower} and trigger {trigger}"),
                        ));
                    }
                }
                TopicMatch::Multiple(count) => {
                    tracing::warn!(
                        resource_type = %type_lower,
                        trigger = %trigger,
                        matches = count,
                        "Ambiguous topic configuration, failing group"
                    );
                    for record in group {
                        response.failures.push(RecordFailure::configuration(
                            record.key(),
                            format!(
                                "{count} topics match type {type_lower} and trigger {trigger}; expected exactly one"
                            ),
                        ));
                    }
                }
                TopicMatch::Unique(topic) => {
                    self.publish_group(tenant, topic, &group, &mut response).await;
                }
            }
        }

        tracing::debug!(
            sent = response.sent.len(),
            failed = response.failures.len(),
            "Event publication completed"
        );

        response
    }

    /// Number of distinct channel senders constructed so far
    pub fn cached_senders(&self) -> usize {
        self.senders.len()
    }

    async fn publish_group(
        &self,
        tenant: &TenantId,
        topic: &crate::core::route::topic::Topic,
        group: &[&Record],
        response: &mut PushResponse,
    ) {
        // A sender failure before any individual send is a whole-group
        // failure; expand it so the caller still gets record granularity.
        let sender = match self.senders.get_or_create(topic.channel()) {
            Ok(sender) => sender,
            Err(e) => {
                tracing::error!(channel = topic.channel(), error = %e, "Failed to obtain sender");
                for record in group {
                    response
                        .failures
                        .push(RecordFailure::destination(record.key(), e.to_string()));
                }
                return;
            }
        };

        let mut sendable = Vec::with_capacity(group.len());
        for record in group {
            match topic.event_for(tenant, record) {
                Ok(event) => sendable.push((*record, event)),
                Err(e) => {
                    response
                        .failures
                        .push(RecordFailure::destination(record.key(), e.to_string()));
                }
            }
        }

        let sends = sendable.iter().map(|(_, event)| sender.send(event));
        let results = join_all(sends).await;

        for ((record, _), result) in sendable.iter().zip(results) {
            match result {
                Ok(()) => response.sent.push(record.key()),
                Err(e) => {
                    response
                        .failures
                        .push(RecordFailure::destination(record.key(), e.to_string()));
                }
            }
        }
    }
}

/// Groups records by lowercase type, preserving first-appearance order of
/// groups and input order within each group
fn group_by_type(records: &[Record]) -> Vec<(String, Vec<&Record>)> {
    let mut groups: Vec<(String, Vec<&Record>)> = Vec::new();
    for record in records {
        let type_lower = record.resource_type.canonical();
        match groups.iter_mut().find(|(t, _)| *t == type_lower) {
            Some((_, members)) => members.push(record),
            None => groups.push((type_lower, vec![record])),
        }
    }
    groups
}
