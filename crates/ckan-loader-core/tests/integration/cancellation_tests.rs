//! Integration tests for cancellation support in LoaderService.

use std::time::Duration;

use ckan_loader_core::{LoaderConfig, LoaderService, SilentReporter};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::integration::common::{MockPortalClient, RecordingReporter};

fn ids(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("ds-{}", i)).collect()
}

#[tokio::test]
async fn test_cancellation_before_start() {
    // Arrange
    let client = MockPortalClient::new(&["a", "b"]);
    let loader = LoaderService::new(client.clone());
    let reporter = RecordingReporter::new();

    let token = CancellationToken::new();
    token.cancel(); // Cancel immediately

    // Act
    let report = loader.load_cancellable(&reporter, token).await.unwrap();

    // Assert
    assert!(report.cancelled);
    assert!(report.documents.is_empty());
    assert_eq!(client.fetch_calls(), 0);
    assert_eq!(reporter.count("cancelled"), 1);
    assert_eq!(reporter.count("listed"), 0);
}

#[tokio::test]
async fn test_cancellation_during_load() {
    // Arrange
    let names = ids(50);
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let client = MockPortalClient::new(&refs).with_delay(Duration::from_millis(20));
    let config = LoaderConfig::default().with_concurrency(1);
    let loader = LoaderService::with_config(client.clone(), config);
    let reporter = RecordingReporter::new();

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    // Act
    let report = loader.load_cancellable(&reporter, token).await.unwrap();

    // Assert
    assert!(report.cancelled);
    assert_eq!(report.total, 50);
    assert!(!report.documents.is_empty(), "some datasets finish before cancel");
    assert!(report.documents.len() < 50);
    assert!(!report.is_complete());
    assert!(client.fetch_calls() < 50);
    assert_eq!(reporter.count("cancelled"), 1);
    assert_eq!(reporter.count("completed"), 0);
}

#[tokio::test]
async fn test_cancellation_during_listing() {
    // Arrange
    let client = MockPortalClient::new(&["a", "b"]).with_list_delay(Duration::from_secs(30));
    let loader = LoaderService::new(client.clone());
    let reporter = RecordingReporter::new();

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    // Act
    let started = std::time::Instant::now();
    let report = loader.load_cancellable(&reporter, token).await.unwrap();

    // Assert
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "listing should be abandoned on cancel"
    );
    assert!(report.cancelled);
    assert_eq!(report.total, 0);
    assert!(report.documents.is_empty());
    assert_eq!(client.fetch_calls(), 0);
    assert_eq!(reporter.count("listed"), 0);
    assert_eq!(reporter.count("cancelled"), 1);
}

#[tokio::test]
async fn test_cancellation_after_completion_is_not_reported() {
    // Arrange
    let client = MockPortalClient::new(&["a", "b", "c"]);
    let loader = LoaderService::new(client);
    let token = CancellationToken::new();

    // Act
    let report = loader
        .load_cancellable(&SilentReporter, token.clone())
        .await
        .unwrap();
    token.cancel();

    // Assert
    assert!(!report.cancelled);
    assert_eq!(report.documents.len(), 3);
    assert!(report.is_complete());
}
