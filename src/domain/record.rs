//! Record and batch types
//!
//! A [`Record`] is the unit of publication: a typed, identified piece of
//! clinical data with opaque JSON content. Records are immutable once
//! dispatched; a new write always means "replace".

use crate::domain::ids::{RecordKey, ResourceType, TenantId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A typed, identified unit of data to be published
///
/// Identity is `(resource_type, id)`. The content is carried as structured
/// JSON and is not interpreted by the pipeline beyond fingerprinting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Resource type (e.g. `Patient`)
    pub resource_type: ResourceType,
    /// Identifier within the type; may be empty on submission, in which
    /// case the record is rejected before any I/O is attempted
    pub id: String,
    /// Opaque structured content
    pub content: Value,
}

impl Record {
    /// Creates a new record
    pub fn new(resource_type: ResourceType, id: impl Into<String>, content: Value) -> Self {
        Self {
            resource_type,
            id: id.into(),
            content,
        }
    }

    /// Returns the record's identity key
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.resource_type.clone(), self.id.clone())
    }

    /// Whether the record carries a usable identifier
    ///
    /// Records without one violate the caller contract and are rejected
    /// without any network calls.
    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }
}

/// Classification of why a batch was published
///
/// Affects topic selection and data-lake path partitioning. A batch
/// published without a trigger is stored for durability only and emits
/// no events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    /// Publication initiated by a recurring schedule
    Scheduled,
    /// Publication requested ad hoc by an operator or upstream system
    AdHoc,
}

impl Trigger {
    /// Path segment used for data-lake partitioning
    pub fn path_segment(&self) -> &'static str {
        match self {
            Trigger::Scheduled => "scheduled",
            Trigger::AdHoc => "adhoc",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for Trigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scheduled" => Ok(Trigger::Scheduled),
            "adhoc" | "ad-hoc" | "ad_hoc" => Ok(Trigger::AdHoc),
            other => Err(format!(
                "Invalid trigger: {other}. Must be one of: scheduled, adhoc"
            )),
        }
    }
}

/// Classification returned by the canonical store for an accepted write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModificationKind {
    /// The record did not exist before this write
    Created,
    /// The record existed and its content changed
    Updated,
    /// The record existed and the write was a no-op
    Unmodified,
}

impl fmt::Display for ModificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModificationKind::Created => "created",
            ModificationKind::Updated => "updated",
            ModificationKind::Unmodified => "unmodified",
        };
        f.write_str(s)
    }
}

/// An ordered collection of records submitted together
#[derive(Debug, Clone)]
pub struct Batch {
    /// Tenant the records belong to
    pub tenant: TenantId,
    /// Records in submission order
    pub records: Vec<Record>,
    /// Optional trigger classification; `None` means store-only publication
    pub trigger: Option<Trigger>,
}

impl Batch {
    /// Creates a batch without a trigger (no events will be emitted)
    pub fn new(tenant: TenantId, records: Vec<Record>) -> Self {
        Self {
            tenant,
            records,
            trigger: None,
        }
    }

    /// Sets the trigger classification
    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Number of records in the batch
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
