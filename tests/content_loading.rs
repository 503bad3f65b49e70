//! Loader behaviour: caching, retries, terminal failures, validation.

use std::sync::Arc;

use kiosk_content::{ContentError, ContentEvent, LoadOptions};
use serde_json::json;

mod common;

use common::CountingSource;

#[tokio::test]
async fn test_cached_load_reads_once() {
    let h = common::harness(3, CountingSource::default()).await;
    let file = h.write("test.json", r#"{"value": "test"}"#);

    let first = h
        .service
        .load_configuration(&file, Some("test"), LoadOptions::default())
        .await
        .unwrap();
    let second = h
        .service
        .load_configuration(&file, Some("test"), LoadOptions::default())
        .await
        .unwrap();

    assert_eq!(h.source.reads(), 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.as_ref(), &json!({"value": "test"}));
}

#[tokio::test]
async fn test_bypassing_cache_reads_again() {
    let h = common::harness(3, CountingSource::default()).await;
    let file = h.write("test.json", r#"{"value": "v1"}"#);

    h.service
        .load_configuration(&file, Some("test"), LoadOptions::default())
        .await
        .unwrap();
    h.write("test.json", r#"{"value": "v2"}"#);
    let fresh = h
        .service
        .load_configuration(&file, Some("test"), LoadOptions::bypass_cache())
        .await
        .unwrap();

    assert_eq!(h.source.reads(), 2);
    assert_eq!(fresh.as_ref(), &json!({"value": "v2"}));
    assert_eq!(h.service.cached(&file).unwrap().as_ref(), &json!({"value": "v2"}));
}

#[tokio::test]
async fn test_transient_failure_recovers_within_budget() {
    let h = common::harness(3, CountingSource::failing_first(2)).await;
    let file = h.write("test.json", r#"{"value": "test"}"#);

    let content = h
        .service
        .load_configuration(&file, Some("test"), LoadOptions::default())
        .await
        .unwrap();

    assert_eq!(content.as_ref(), &json!({"value": "test"}));
    assert_eq!(h.source.reads(), 3);
}

#[tokio::test]
async fn test_exhausted_retries_surface_final_error() {
    let h = common::harness(2, CountingSource::failing_first(u32::MAX)).await;
    let file = h.write("test.json", r#"{"value": "test"}"#);

    let err = h
        .service
        .load_configuration(&file, Some("test"), LoadOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ContentError::Read { .. }), "got {err}");
    assert!(err.to_string().contains("simulated transient failure"));
    assert_eq!(h.source.reads(), 3);
    assert_eq!(h.service.cache_stats().size, 0);
}

#[tokio::test]
async fn test_malformed_content_is_retried_then_reported() {
    let h = common::harness(2, CountingSource::default()).await;
    let file = h.write("test.json", r#"{"value": "#);

    let err = h
        .service
        .load_configuration(&file, Some("test"), LoadOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ContentError::Parse { .. }));
    assert_eq!(h.source.reads(), 3);
}

#[tokio::test]
async fn test_unsupported_format_is_not_retried() {
    let h = common::harness(3, CountingSource::default()).await;
    let file = h.write("feed.xml", "<feed/>");

    let err = h
        .service
        .load_configuration(&file, None, LoadOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ContentError::UnsupportedFormat { .. }));
    assert!(err.to_string().contains("Unsupported file format"));
    assert_eq!(h.source.reads(), 0);
}

#[tokio::test]
async fn test_missing_file_is_not_retried() {
    let h = common::harness(3, CountingSource::default()).await;
    let file = h.path("absent.json");

    let err = h
        .service
        .load_configuration(&file, Some("test"), LoadOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ContentError::FileNotFound(_)));
    assert_eq!(h.source.reads(), 0);
    assert!(!h.service.file_exists(&file).await);
}

#[tokio::test]
async fn test_validation_failure_keeps_previous_content() {
    let h = common::harness(3, CountingSource::default()).await;
    let file = h.write("test.json", r#"{"value": "good"}"#);
    h.service
        .load_configuration(&file, Some("test"), LoadOptions::default())
        .await
        .unwrap();

    let mut rx = h.service.subscribe();
    h.write("test.json", r#"{"invalid": "content"}"#);
    let err = h
        .service
        .load_configuration(&file, Some("test"), LoadOptions::bypass_cache())
        .await
        .unwrap_err();

    // Terminal: read once, no retries.
    assert_eq!(h.source.reads(), 2);
    assert!(err.validation_errors().iter().any(|e| e.contains("value")));

    match common::wait_for(&mut rx, "validation-error").await {
        ContentEvent::ValidationFailed { file_path, schema_key, error } => {
            assert_eq!(file_path, file);
            assert_eq!(schema_key.as_deref(), Some("test"));
            assert!(!error.validation_errors().is_empty());
        }
        other => panic!("unexpected event: {}", other.name()),
    }
    assert_eq!(h.service.cached(&file).unwrap().as_ref(), &json!({"value": "good"}));
}

#[tokio::test]
async fn test_unknown_schema_is_a_validation_failure() {
    let h = common::harness(3, CountingSource::default()).await;
    let file = h.write("test.json", r#"{"value": "test"}"#);

    let err = h
        .service
        .load_configuration(&file, Some("nonexistent"), LoadOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.validation_errors(), &["Schema not found: nonexistent".to_string()]);
}

#[tokio::test]
async fn test_validate_content() {
    let h = common::harness(3, CountingSource::default()).await;

    let ok = h.service.validate_content(&json!({"value": "test"}), "test");
    assert!(ok.valid);
    assert!(ok.errors.is_empty());

    let missing = h.service.validate_content(&json!({"other": "x"}), "test");
    assert!(!missing.valid);
    assert!(missing.errors.iter().any(|e| e.starts_with("root: ") && e.contains("value")));

    let wrong_type = h.service.validate_content(&json!({"value": 42}), "test");
    assert!(!wrong_type.valid);
    assert!(wrong_type.errors[0].starts_with("root/value: "));

    assert_eq!(h.service.available_schemas(), vec!["test".to_string()]);
}

#[tokio::test]
async fn test_distinct_spellings_share_one_entry() {
    let h = common::harness(3, CountingSource::default()).await;
    let file = h.write("test.json", r#"{"value": "test"}"#);
    std::fs::create_dir(h.path("sub")).unwrap();
    let roundabout = h.path("sub").join("..").join("test.json");

    h.service
        .load_configuration(&file, Some("test"), LoadOptions::default())
        .await
        .unwrap();
    h.service
        .load_configuration(&roundabout, Some("test"), LoadOptions::default())
        .await
        .unwrap();

    assert_eq!(h.source.reads(), 1);
    assert_eq!(h.service.cache_stats().keys, vec![file.clone()]);
    assert!(h.service.clear_cache_for_file(&roundabout));
    assert_eq!(h.service.cache_stats().size, 0);
}
