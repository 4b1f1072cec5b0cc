//! Content fingerprinting and normalization
//!
//! Fingerprints are SHA-256 hashes over canonical JSON: keys sorted
//! recursively and volatile server-assigned metadata stripped, so two
//! writers producing semantically identical content agree on the hash.

use crate::domain::{MeridianError, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Metadata keys assigned by the canonical store on write. They differ
/// between a candidate record and its stored prior even when the clinical
/// content is identical, so they are excluded from comparison.
const VOLATILE_META_KEYS: [&str; 3] = ["versionId", "lastUpdated", "source"];

/// Calculates the structural fingerprint of record content
///
/// Normalizes the content first, so key ordering, whitespace and volatile
/// server metadata never affect the result.
///
/// # Returns
///
/// Returns a hex-encoded SHA-256 string (64 characters).
///
/// # Examples
///
/// ```
/// use meridian::core::change::fingerprint::content_fingerprint;
/// use serde_json::json;
///
/// let fp = content_fingerprint(&json!({"status": "final"})).unwrap();
/// assert_eq!(fp.len(), 64);
/// ```
pub fn content_fingerprint(content: &Value) -> Result<String> {
    let normalized = normalize_content(content);
    let data = serde_json::to_string(&normalized)
        .map_err(|e| MeridianError::Serialization(e.to_string()))?;

    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    let digest = hasher.finalize();
    Ok(format!("{digest:x}"))
}

/// Normalizes record content for comparison
///
/// Recursively sorts object keys and strips volatile server-assigned
/// metadata (`meta.versionId`, `meta.lastUpdated`, `meta.source`) from the
/// top-level object. An emptied `meta` object is removed entirely.
pub fn normalize_content(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted: std::collections::BTreeMap<String, Value> =
                std::collections::BTreeMap::new();
            for (k, v) in map {
                if k == "meta" {
                    if let Some(meta) = strip_volatile_meta(v) {
                        sorted.insert(k.clone(), meta);
                    }
                    continue;
                }
                sorted.insert(k.clone(), sort_keys(v));
            }
            Value::Object(sorted.into_iter().collect())
        }
        other => sort_keys(other),
    }
}

/// Whether two contents are structurally identical once normalized
pub fn structurally_equal(a: &Value, b: &Value) -> bool {
    normalize_content(a) == normalize_content(b)
}

fn strip_volatile_meta(meta: &Value) -> Option<Value> {
    let Value::Object(map) = meta else {
        return Some(sort_keys(meta));
    };

    let mut kept: std::collections::BTreeMap<String, Value> = std::collections::BTreeMap::new();
    for (k, v) in map {
        if VOLATILE_META_KEYS.contains(&k.as_str()) {
            continue;
        }
        kept.insert(k.clone(), sort_keys(v));
    }

    if kept.is_empty() {
        None
    } else {
        Some(Value::Object(kept.into_iter().collect()))
    }
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted: std::collections::BTreeMap<String, Value> =
                std::collections::BTreeMap::new();
            for (k, v) in map {
                sorted.insert(k.clone(), sort_keys(v));
            }
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_keys).collect()),
        _ => value.clone(),
    }
}
