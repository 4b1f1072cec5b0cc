//! Business logic for the publication pipeline
//!
//! - [`change`] - Change detection cache and content fingerprinting
//! - [`dispatch`] - Chunked, bounded-concurrency task dispatch
//! - [`route`] - Topic routing and event publication
//! - [`publish`] - The orchestrator that ties the stages together

pub mod change;
pub mod dispatch;
pub mod publish;
pub mod route;
