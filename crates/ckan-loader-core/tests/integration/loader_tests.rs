//! Integration tests for LoaderService.

use std::sync::atomic::Ordering;
use std::time::Duration;

use ckan_loader_core::{AppError, FailurePolicy, LoaderConfig, LoaderService, PLACEHOLDER};

use crate::integration::common::{MockPortalClient, RecordingReporter};

#[tokio::test]
async fn test_load_renders_one_document_per_id() {
    let client = MockPortalClient::new(&["a", "b", "c"]);
    let loader = LoaderService::new(client.clone());

    let documents = loader.load().await.unwrap();

    assert_eq!(documents.len(), 3);
    assert_eq!(client.fetch_calls(), 3);
    assert_eq!(client.counters.list_calls.load(Ordering::SeqCst), 1);

    let mut ids: Vec<&str> = documents.iter().filter_map(|d| d.dataset_id()).collect();
    ids.sort();
    assert_eq!(ids, vec!["a", "b", "c"]);

    let doc = &documents[0];
    assert_eq!(doc.metadata()["frequence_mise_a_jour"], "hebdomadaire");
    assert_eq!(doc.metadata()["formats_ressources"], "CSV");
}

#[tokio::test]
async fn test_load_does_not_deduplicate_ids() {
    let client = MockPortalClient::new(&["a", "a", "b"]);
    let loader = LoaderService::new(client.clone());

    let documents = loader.load().await.unwrap();

    assert_eq!(documents.len(), 3);
    assert_eq!(client.fetch_calls(), 3);
}

#[tokio::test]
async fn test_load_empty_catalogue() {
    let client = MockPortalClient::new(&[]);
    let loader = LoaderService::new(client.clone());

    let report = loader
        .load_with_progress(&RecordingReporter::new())
        .await
        .unwrap();

    assert!(report.documents.is_empty());
    assert_eq!(report.total, 0);
    assert!(report.is_complete());
    assert_eq!(client.fetch_calls(), 0);
}

#[tokio::test]
async fn test_protocol_error_produces_no_documents() {
    let client = MockPortalClient::new(&["a", "b"]).with_protocol_error("text/html");
    let loader = LoaderService::new(client.clone());

    let result = loader.load().await;

    match result {
        Err(AppError::ProtocolError { content_type, .. }) => assert_eq!(content_type, "text/html"),
        other => panic!("Expected ProtocolError, got {:?}", other),
    }
    assert_eq!(client.fetch_calls(), 0);
}

#[tokio::test]
async fn test_fail_fast_returns_first_fetch_error() {
    let client = MockPortalClient::new(&["a", "broken", "c"]).with_failing(&["broken"]);
    let config = LoaderConfig::default().with_concurrency(1);
    let loader = LoaderService::with_config(client, config);

    let err = loader.load().await.unwrap_err();

    assert!(matches!(err, AppError::FetchError { .. }));
    assert_eq!(err.dataset_id(), Some("broken"));
}

#[tokio::test]
async fn test_fail_fast_reports_failure_once() {
    let client = MockPortalClient::new(&["a", "broken"]).with_failing(&["broken"]);
    let config = LoaderConfig::default().with_concurrency(1);
    let loader = LoaderService::with_config(client, config);
    let reporter = RecordingReporter::new();

    let err = loader.load_with_progress(&reporter).await.unwrap_err();

    assert_eq!(err.dataset_id(), Some("broken"));
    assert_eq!(reporter.count("failed"), 1);
    assert_eq!(reporter.count("completed"), 0);
}

#[tokio::test]
async fn test_fail_fast_stops_dispatching() {
    let ids: Vec<String> = (0..20).map(|i| format!("ds-{}", i)).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let client = MockPortalClient::new(&id_refs)
        .with_failing(&["ds-0"])
        .with_delay(Duration::from_millis(5));
    let config = LoaderConfig::default().with_concurrency(2);
    let loader = LoaderService::with_config(client.clone(), config);

    assert!(loader.load().await.is_err());
    assert!(
        client.fetch_calls() < 20,
        "fetches after the failure should not be dispatched, got {}",
        client.fetch_calls()
    );
}

#[tokio::test]
async fn test_collect_policy_keeps_going() {
    let client = MockPortalClient::new(&["a", "broken", "c"]).with_failing(&["broken"]);
    let config = LoaderConfig::default().with_failure_policy(FailurePolicy::Collect);
    let loader = LoaderService::with_config(client.clone(), config);
    let reporter = RecordingReporter::new();

    let report = loader.load_with_progress(&reporter).await.unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.documents.len(), 2);
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.failures[0].dataset_id(), Some("broken"));
    assert!(!report.is_complete());
    assert!(!report.cancelled);
    assert_eq!(reporter.count("failed broken"), 1);
    assert!(reporter.events().contains(&"completed 2 1".to_string()));
}

#[tokio::test]
async fn test_documents_are_returned_in_completion_order() {
    let client = MockPortalClient::new(&["slow", "fast"]).with_delays(&[("slow", 80), ("fast", 1)]);
    let config = LoaderConfig::default().with_concurrency(2);
    let loader = LoaderService::with_config(client, config);

    let documents = loader.load().await.unwrap();

    let ids: Vec<&str> = documents.iter().filter_map(|d| d.dataset_id()).collect();
    assert_eq!(ids, vec!["fast", "slow"]);
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    let ids: Vec<String> = (0..12).map(|i| format!("ds-{}", i)).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let client = MockPortalClient::new(&id_refs).with_delay(Duration::from_millis(10));
    let config = LoaderConfig::default().with_concurrency(3);
    let loader = LoaderService::with_config(client.clone(), config);

    let documents = loader.load().await.unwrap();

    assert_eq!(documents.len(), 12);
    assert!(client.max_in_flight() <= 3);
    assert!(client.max_in_flight() >= 2);
}

#[tokio::test]
async fn test_drop_placeholders_flows_from_config() {
    let client = MockPortalClient::new(&["a"]);

    let kept = LoaderService::new(client.clone()).load().await.unwrap();
    assert_eq!(kept[0].metadata()["etat"], PLACEHOLDER);

    let config = LoaderConfig::default().with_drop_placeholders(true);
    let dropped = LoaderService::with_config(client, config)
        .load()
        .await
        .unwrap();
    assert!(!dropped[0].metadata().contains_key("etat"));
    assert_eq!(dropped[0].metadata()["title"], "Jeu de données a");
}

#[tokio::test]
async fn test_progress_events() {
    let client = MockPortalClient::new(&["a", "b"]);
    let loader = LoaderService::new(client);
    let reporter = RecordingReporter::new();

    loader.load_with_progress(&reporter).await.unwrap();

    let events = reporter.events();
    assert_eq!(events.first().unwrap(), "started https://test-portal.example.com/");
    assert!(events.contains(&"listed 2".to_string()));
    assert!(events.contains(&"rendered 2/2".to_string()));
    assert_eq!(events.last().unwrap(), "completed 2 0");
}

#[tokio::test]
async fn test_load_one() {
    let client = MockPortalClient::new(&["a"]).with_failing(&["b"]);
    let loader = LoaderService::new(client);

    let doc = loader.load_one("a").await.unwrap();
    assert!(doc.content().contains("Jeu de données a"));

    let err = loader.load_one("b").await.unwrap_err();
    assert_eq!(err.dataset_id(), Some("b"));

    let err = loader.load_one("missing").await.unwrap_err();
    assert_eq!(err.dataset_id(), Some("missing"));
}

#[tokio::test]
async fn test_schema_is_passed_in() {
    let client = MockPortalClient::new(&[]);
    let schema = ckan_loader_core::DocumentSchema::quebec().with_content_info("Portail test");
    let loader = LoaderService::new(client).with_schema(schema);

    assert_eq!(loader.schema().document_content_info, "Portail test");
    assert_eq!(loader.schema().metadata_field_info.len(), 23);
}
