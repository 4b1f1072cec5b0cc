//! Publication orchestration

pub mod orchestrator;

pub use orchestrator::{Publisher, PublisherSettings};
