//! Topic configuration
//!
//! A topic maps a record type (and optionally a trigger) to a destination
//! channel, a schema identifier, and a payload converter. Exactly zero or
//! one topic must match a given `(type, trigger)` pair; more than one is a
//! configuration error surfaced per record at publish time.

use crate::domain::event::EventEnvelope;
use crate::domain::ids::TenantId;
use crate::domain::record::{Record, Trigger};
use crate::domain::Result;
use serde_json::Value;
use std::sync::Arc;

/// Converts a record into the event payload for its topic
pub type PayloadConverter = Arc<dyn Fn(&TenantId, &Record) -> Result<Value> + Send + Sync>;

/// Static routing entry for one record type
#[derive(Clone)]
pub struct Topic {
    resource_type: String,
    trigger: Option<Trigger>,
    channel: String,
    schema: String,
    converter: PayloadConverter,
}

impl Topic {
    /// Creates a topic matching a record type under any trigger
    ///
    /// # Arguments
    ///
    /// * `resource_type` - Record type to match (case-insensitive)
    /// * `channel` - Destination channel name
    /// * `schema` - Namespace-qualified schema id (e.g. `clinical.patient`)
    /// * `converter` - Payload converter `(tenant, record) -> payload`
    pub fn new(
        resource_type: impl Into<String>,
        channel: impl Into<String>,
        schema: impl Into<String>,
        converter: PayloadConverter,
    ) -> Self {
        Self {
            resource_type: resource_type.into().to_lowercase(),
            trigger: None,
            channel: channel.into(),
            schema: schema.into(),
            converter,
        }
    }

    /// Restricts the topic to one trigger classification
    pub fn for_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Destination channel name
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Schema identifier
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Whether this topic routes the given `(type, trigger)` pair
    pub fn matches(&self, resource_type_lower: &str, trigger: Trigger) -> bool {
        if self.resource_type != resource_type_lower {
            return false;
        }
        match self.trigger {
            None => true,
            Some(t) => t == trigger,
        }
    }

    /// Derives the event envelope for one record
    ///
    /// Deterministic: event type is `<schema>.published`, subject is
    /// `<schema>/<id>`, payload comes from the converter.
    ///
    /// # Errors
    ///
    /// Returns an error if the converter fails.
    pub fn event_for(&self, tenant: &TenantId, record: &Record) -> Result<EventEnvelope> {
        let payload = (self.converter)(tenant, record)?;
        Ok(EventEnvelope::new(
            format!("{}.published", self.schema),
            format!("{}/{}", self.schema, record.id),
            payload,
        ))
    }
}

impl std::fmt::Debug for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Topic")
            .field("resource_type", &self.resource_type)
            .field("trigger", &self.trigger)
            .field("channel", &self.channel)
            .field("schema", &self.schema)
            .finish()
    }
}

/// Result of a topic lookup for a `(type, trigger)` pair
#[derive(Debug)]
pub enum TopicMatch<'a> {
    /// No topic is registered for the pair
    None,
    /// Exactly one topic matched
    Unique(&'a Topic),
    /// More than one topic matched; carries the match count
    Multiple(usize),
}

/// The set of registered topics
#[derive(Default, Clone)]
pub struct TopicRegistry {
    topics: Vec<Topic>,
}

impl TopicRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a topic
    pub fn register(mut self, topic: Topic) -> Self {
        self.topics.push(topic);
        self
    }

    /// Looks up the topic for a `(type, trigger)` pair
    pub fn lookup(&self, resource_type_lower: &str, trigger: Trigger) -> TopicMatch<'_> {
        let mut matches = self
            .topics
            .iter()
            .filter(|t| t.matches(resource_type_lower, trigger));

        match (matches.next(), matches.next()) {
            (None, _) => TopicMatch::None,
            (Some(topic), None) => TopicMatch::Unique(topic),
            (Some(_), Some(_)) => TopicMatch::Multiple(2 + matches.count()),
        }
    }

    /// Number of registered topics
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

/// Converter that passes the record content through unchanged, wrapped with
/// tenant and identity fields
pub fn identity_converter() -> PayloadConverter {
    Arc::new(|tenant, record| {
        Ok(serde_json::json!({
            "tenant": tenant.as_str(),
            "resourceType": record.resource_type.as_str(),
            "id": record.id,
            "content": record.content,
        }))
    })
}
