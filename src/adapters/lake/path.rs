//! Data-lake path construction
//!
//! Paths encode tenant, date, resource type and id so downstream analytics
//! can partition on them:
//! `<root>[/<trigger>]/<type>/tenant=<tenant>/date=<YYYY-MM-DD>/<id>.json`

use crate::domain::ids::TenantId;
use crate::domain::record::{Record, Trigger};
use chrono::NaiveDate;

/// Builds deterministic object-store paths for record uploads
#[derive(Debug, Clone)]
pub struct LakePathBuilder {
    root: String,
}

impl LakePathBuilder {
    /// Creates a path builder with the given root prefix
    pub fn new(root: impl Into<String>) -> Self {
        let root = root.into();
        Self {
            root: root.trim_matches('/').to_string(),
        }
    }

    /// Builds the upload path for a record on a specific date
    ///
    /// The trigger classification, when present, adds a partition segment
    /// under the root so scheduled and ad-hoc publications land separately.
    pub fn path_for(
        &self,
        tenant: &TenantId,
        trigger: Option<Trigger>,
        record: &Record,
        date: NaiveDate,
    ) -> String {
        let mut segments = vec![self.root.clone()];
        if let Some(trigger) = trigger {
            segments.push(trigger.path_segment().to_string());
        }
        segments.push(record.resource_type.canonical());
        segments.push(format!("tenant={tenant}"));
        segments.push(format!("date={}", date.format("%Y-%m-%d")));
        segments.push(format!("{}.json", record.id));
        segments.join("/")
    }

    /// Builds the upload path for a record dated today (UTC)
    pub fn path_for_today(
        &self,
        tenant: &TenantId,
        trigger: Option<Trigger>,
        record: &Record,
    ) -> String {
        self.path_for(tenant, trigger, record, chrono::Utc::now().date_naive())
    }
}
