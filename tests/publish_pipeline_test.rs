//! End-to-end publication pipeline tests against in-memory destinations

mod common;

use common::{fixture, fixture_with, record, tenant};
use meridian::adapters::store::StoreWriteOutcome;
use meridian::core::publish::PublisherSettings;
use meridian::domain::ids::ResourceType;
use meridian::domain::outcome::FailureKind;
use meridian::domain::record::{ModificationKind, Trigger};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::time::Duration;

#[tokio::test]
async fn test_round_trip_reaches_all_destinations() {
    let fx = fixture();
    let records = vec![
        record("Patient", "123", json!({"name": "Ada"})),
        record("Observation", "obs-1", json!({"value": 7})),
    ];

    let response = fx
        .publisher
        .publish(&tenant(), records, Some(Trigger::Scheduled))
        .await;

    assert!(response.is_success());
    assert_eq!(response.stored.len(), 2);
    assert!(response
        .stored
        .iter()
        .all(|s| s.kind == ModificationKind::Created));

    let uploads = fx.lake.uploads.lock().unwrap().clone();
    assert_eq!(uploads.len(), 2);
    let patient_path = uploads.iter().find(|p| p.ends_with("123.json")).unwrap();
    assert!(patient_path.contains("tenant=mdaoc"));
    assert!(patient_path.contains("/scheduled/"));
    assert!(patient_path.contains("/patient/"));

    assert_eq!(response.events_sent.len(), 2);
    assert_eq!(fx.broker.sent_count(), 2);
    assert!(fx.store.contains("Patient", "123"));
}

#[tokio::test]
async fn test_empty_batch_is_immediate_success() {
    let fx = fixture();
    let response = fx
        .publisher
        .publish(&tenant(), Vec::new(), Some(Trigger::AdHoc))
        .await;

    assert!(response.is_success());
    assert_eq!(fx.store.add_calls.load(Ordering::SeqCst), 0);
    assert_eq!(fx.lake.upload_count(), 0);
    assert_eq!(fx.broker.sent_count(), 0);
}

#[tokio::test]
async fn test_empty_id_rejected_without_io() {
    let fx = fixture();
    let records = vec![
        record("Patient", "ok-1", json!({"a": 1})),
        record("Patient", "", json!({"a": 2})),
    ];

    let response = fx
        .publisher
        .publish(&tenant(), records, Some(Trigger::AdHoc))
        .await;

    assert_eq!(response.rejected.len(), 1);
    assert_eq!(response.rejected[0].kind, FailureKind::Rejection);
    assert_eq!(response.stored.len(), 1);

    // No destination call is attributable to the rejected record.
    let added = fx.store.added_ids.lock().unwrap().clone();
    assert_eq!(added, vec!["ok-1".to_string()]);
    assert_eq!(fx.lake.upload_count(), 1);
    assert_eq!(fx.broker.sent_count(), 1);
}

#[tokio::test]
async fn test_all_rejected_batch_makes_no_calls() {
    let fx = fixture();
    let records = vec![record("Patient", "  ", json!({}))];

    let response = fx.publisher.publish(&tenant(), records, None).await;

    assert_eq!(response.rejected.len(), 1);
    assert_eq!(fx.store.add_calls.load(Ordering::SeqCst), 0);
    assert_eq!(fx.lake.upload_count(), 0);
}

#[tokio::test]
async fn test_store_rejection_blocks_downstream() {
    let fx = fixture();
    *fx.store.outcome_override.lock().unwrap() =
        Some(StoreWriteOutcome::ServerLike("503 unavailable".to_string()));

    let records = vec![
        record("Patient", "1", json!({"a": 1})),
        record("Patient", "2", json!({"a": 2})),
    ];
    let response = fx
        .publisher
        .publish(&tenant(), records, Some(Trigger::Scheduled))
        .await;

    assert_eq!(response.store_failures.len(), 2);
    assert!(response.stored.is_empty());
    assert_eq!(fx.lake.upload_count(), 0);
    assert_eq!(fx.broker.sent_count(), 0);
    assert!(response.store_failures[0].message.contains("503"));
}

#[tokio::test]
async fn test_partial_store_failure_isolated() {
    let fx = fixture();
    fx.store.fail_id("bad");

    let records = vec![
        record("Patient", "good-1", json!({"a": 1})),
        record("Patient", "bad", json!({"a": 2})),
        record("Patient", "good-2", json!({"a": 3})),
    ];
    let response = fx
        .publisher
        .publish(&tenant(), records, Some(Trigger::Scheduled))
        .await;

    assert_eq!(response.stored.len(), 2);
    assert_eq!(response.store_failures.len(), 1);
    assert_eq!(response.store_failures[0].key.id, "bad");
    assert_eq!(fx.lake.upload_count(), 2);
    assert_eq!(response.events_sent.len(), 2);
}

#[tokio::test]
async fn test_lake_failure_does_not_touch_store_or_events() {
    let fx = fixture();
    *fx.lake.fail_paths_containing.lock().unwrap() = Some("123".to_string());

    let records = vec![
        record("Patient", "123", json!({"a": 1})),
        record("Patient", "456", json!({"a": 2})),
    ];
    let response = fx
        .publisher
        .publish(&tenant(), records, Some(Trigger::AdHoc))
        .await;

    assert_eq!(response.stored.len(), 2);
    assert_eq!(response.lake_published.len(), 1);
    assert_eq!(response.lake_failures.len(), 1);
    assert_eq!(response.lake_failures[0].key.id, "123");
    // The record stays durable and its event still goes out.
    assert!(fx.store.contains("Patient", "123"));
    assert_eq!(response.events_sent.len(), 2);
}

#[tokio::test]
async fn test_unmodified_republish_skips_lake_but_still_notifies() {
    let fx = fixture();
    let make = || vec![record("Patient", "123", json!({"name": "Ada"}))];

    let first = fx
        .publisher
        .publish(&tenant(), make(), Some(Trigger::Scheduled))
        .await;
    assert_eq!(first.lake_published.len(), 1);

    let second = fx
        .publisher
        .publish(&tenant(), make(), Some(Trigger::Scheduled))
        .await;

    assert_eq!(second.stored.len(), 1);
    assert_eq!(second.stored[0].kind, ModificationKind::Unmodified);
    assert!(second.lake_published.is_empty());
    assert_eq!(fx.lake.upload_count(), 1);
    assert_eq!(second.events_sent.len(), 1);
    assert_eq!(fx.broker.sent_count(), 2);
}

#[tokio::test]
async fn test_changed_content_reuploads() {
    let fx = fixture();

    fx.publisher
        .publish(
            &tenant(),
            vec![record("Patient", "123", json!({"v": 1}))],
            Some(Trigger::Scheduled),
        )
        .await;

    let second = fx
        .publisher
        .publish(
            &tenant(),
            vec![record("Patient", "123", json!({"v": 2}))],
            Some(Trigger::Scheduled),
        )
        .await;

    assert_eq!(second.stored[0].kind, ModificationKind::Updated);
    assert_eq!(second.lake_published.len(), 1);
    assert_eq!(fx.lake.upload_count(), 2);
}

#[tokio::test]
async fn test_no_trigger_means_no_events_and_no_trigger_path_segment() {
    let fx = fixture();
    let response = fx
        .publisher
        .publish(
            &tenant(),
            vec![record("Patient", "123", json!({"a": 1}))],
            None,
        )
        .await;

    assert_eq!(response.stored.len(), 1);
    assert_eq!(response.lake_published.len(), 1);
    assert!(response.events_sent.is_empty());
    assert_eq!(fx.broker.created.load(Ordering::SeqCst), 0);

    let uploads = fx.lake.uploads.lock().unwrap().clone();
    assert!(!uploads[0].contains("/scheduled/"));
    assert!(!uploads[0].contains("/adhoc/"));
}

#[tokio::test]
async fn test_retract_makes_republish_changed_again() {
    let fx = fixture();
    let patient = ResourceType::new("Patient").unwrap();
    let make = || vec![record("Patient", "123", json!({"name": "Ada"}))];

    fx.publisher.publish(&tenant(), make(), None).await;
    fx.publisher.retract(&patient, "123").await.unwrap();
    assert!(!fx.store.contains("Patient", "123"));

    let response = fx.publisher.publish(&tenant(), make(), None).await;
    assert_eq!(response.stored[0].kind, ModificationKind::Created);
    assert_eq!(fx.lake.upload_count(), 2);
}

#[tokio::test]
async fn test_publish_or_fail_carries_full_response() {
    let fx = fixture();
    fx.store.fail_id("bad");

    let records = vec![
        record("Patient", "good", json!({"a": 1})),
        record("Patient", "bad", json!({"a": 2})),
    ];
    let err = fx
        .publisher
        .publish_or_fail(&tenant(), records, None)
        .await
        .unwrap_err();

    assert_eq!(err.response.stored.len(), 1);
    assert_eq!(err.response.store_failures.len(), 1);
    assert!(err.to_string().contains("1 store failure(s)"));
}

#[tokio::test]
async fn test_fire_and_forget_detaches_lake_uploads() {
    let settings = PublisherSettings {
        fire_and_forget: true,
        ..PublisherSettings::default()
    };
    let fx = fixture_with(common::default_registry(), settings);

    let response = fx
        .publisher
        .publish(
            &tenant(),
            vec![record("Patient", "123", json!({"a": 1}))],
            None,
        )
        .await;

    // Detached uploads never appear in the response.
    assert!(response.lake_published.is_empty());
    assert!(response.lake_failures.is_empty());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(fx.lake.upload_count(), 1);
}

#[tokio::test]
async fn test_large_batch_spans_multiple_chunks() {
    let fx = fixture();
    let records: Vec<_> = (0..60)
        .map(|n| record("Patient", &format!("p-{n}"), json!({"n": n})))
        .collect();

    let response = fx
        .publisher
        .publish(&tenant(), records, Some(Trigger::Scheduled))
        .await;

    assert_eq!(response.stored.len(), 60);
    // Default chunk size is 25, so 60 records need 3 store calls.
    assert_eq!(fx.store.add_calls.load(Ordering::SeqCst), 3);
    assert_eq!(fx.lake.upload_count(), 60);
    assert_eq!(response.events_sent.len(), 60);
}
