//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers that flow through the publication
//! pipeline. Each type rejects empty values at construction so downstream
//! code never has to re-validate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tenant identifier newtype wrapper
///
/// Identifies the organization a batch of records belongs to. Used for
/// event payload conversion and data-lake path partitioning.
///
/// # Examples
///
/// ```
/// use meridian::domain::ids::TenantId;
/// use std::str::FromStr;
///
/// let tenant = TenantId::from_str("mdaoc").unwrap();
/// assert_eq!(tenant.as_str(), "mdaoc");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(String);

impl TenantId {
    /// Creates a new TenantId from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(TenantId)` if the ID is non-empty, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Tenant ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the tenant ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TenantId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Resource type newtype wrapper
///
/// The type half of a record's identity (e.g. `Patient`, `Observation`).
/// Stored as supplied; topic routing and the fingerprint cache compare
/// types case-insensitively via [`ResourceType::canonical`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceType(String);

impl ResourceType {
    /// Creates a new ResourceType from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(ResourceType)` if the type is non-empty, `Err` otherwise
    pub fn new(resource_type: impl Into<String>) -> Result<Self, String> {
        let resource_type = resource_type.into();
        if resource_type.trim().is_empty() {
            return Err("Resource type cannot be empty".to_string());
        }
        Ok(Self(resource_type))
    }

    /// Returns the resource type as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the lowercase form used for case-insensitive matching
    pub fn canonical(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ResourceType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Record identity: `(resource type, id)`
///
/// Every per-record outcome in a [`PublishResponse`](crate::domain::outcome::PublishResponse)
/// is keyed by this pair so callers can reconcile status across destinations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    /// Resource type of the record
    pub resource_type: ResourceType,
    /// Identifier of the record within its type
    pub id: String,
}

impl RecordKey {
    /// Creates a new record key
    pub fn new(resource_type: ResourceType, id: impl Into<String>) -> Self {
        Self {
            resource_type,
            id: id.into(),
        }
    }

    /// Returns the `(lowercase type, id)` pair used by the fingerprint cache
    pub fn canonical(&self) -> (String, String) {
        (self.resource_type.canonical(), self.id.clone())
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource_type, self.id)
    }
}
