//! Change detection
//!
//! Content fingerprinting and the cache-backed filter that keeps unchanged
//! records out of the data lake.

pub mod detector;
pub mod fingerprint;

pub use detector::ChangeDetector;
pub use fingerprint::{content_fingerprint, normalize_content, structurally_equal};
