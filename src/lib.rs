// Meridian - Multi-destination publication pipeline for clinical records
// Copyright (c) 2026 Meridian Contributors
// Licensed under the MIT License

//! # Meridian
//!
//! Meridian moves clinical data records from an ingestion pipeline into
//! several independent downstream stores: a canonical resource store, a
//! columnar data lake, and an event bus. Any one destination may be slow or
//! failing; failures stay local to the record and the destination they hit.
//!
//! ## Overview
//!
//! A `publish` call runs three sequential stages, each fanning out
//! concurrently inside:
//!
//! 1. **Store** - all valid records go to the canonical store in chunked
//!    batch upserts; the store classifies each accepted write as created,
//!    updated or unmodified.
//! 2. **Lake** - store-accepted records whose content actually changed are
//!    uploaded to the data lake, one object per record, under a
//!    tenant/date-partitioned path.
//! 3. **Bus** - when a trigger classification is supplied, every
//!    store-accepted record (including unmodified ones) emits one event to
//!    its type's topic channel.
//!
//! The result is a single [`domain::PublishResponse`] keyed by record
//! identity, with separate failure lists per destination.
//!
//! ## Architecture
//!
//! - [`core`] - Business logic (orchestration, change detection, chunked
//!   dispatch, topic routing)
//! - [`adapters`] - Destination contracts (resource store, object store,
//!   event broker)
//! - [`domain`] - Record, identity, outcome and error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Guarantees
//!
//! - A record with an empty id is rejected before any I/O.
//! - A record reaches the lake or the bus only after the canonical store
//!   accepted it; there is no compensating transaction.
//! - Re-publishing an unchanged record never triggers a lake upload.
//! - One slow or failing chunk never blocks or fails unrelated chunks.
//! - Dispatcher output order always matches input order.
//!
//! ## Error Handling
//!
//! Fallible operations return [`domain::Result`] with the
//! [`domain::MeridianError`] hierarchy. Batch publication itself does not
//! fail fast: per-record failures are aggregated in the response, and
//! callers that prefer an error can use
//! `PublishResponse::into_result`, whose [`domain::PublishError`] still
//! carries the full per-record outcome.

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
