//! Test utilities and mock implementations for integration tests.
//!
//! Provides an in-memory [`PortalClient`] and a recording
//! [`ProgressReporter`] for testing `LoaderService` in isolation.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ckan_loader_core::{AppError, LoaderEvent, PortalClient, ProgressReporter, RawRecord};
use serde_json::{Value, json};

pub const TEST_PORTAL_URL: &str = "https://test-portal.example.com/";

/// Builds a minimal CKAN record for `id`.
pub fn sample_record(id: &str) -> RawRecord {
    match json!({
        "id": id,
        "name": format!("dataset-{}", id),
        "title": format!("Jeu de données {}", id),
        "update_frequency": "weekly",
        "num_resources": 1,
        "resources": [{"format": "CSV"}],
    }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

// =============================================================================
// MockPortalClient
// =============================================================================

/// Shared counters observed by tests.
#[derive(Default)]
pub struct MockCounters {
    pub list_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

/// Mock portal client with configurable ids, records, failures and latency.
#[derive(Clone)]
pub struct MockPortalClient {
    ids: Vec<String>,
    records: Arc<HashMap<String, RawRecord>>,
    failing: Arc<HashSet<String>>,
    delays: Arc<HashMap<String, Duration>>,
    default_delay: Duration,
    list_delay: Duration,
    list_error: Option<(String, String)>,
    pub counters: Arc<MockCounters>,
}

impl MockPortalClient {
    /// A portal listing `ids`, each resolving to [`sample_record`].
    pub fn new(ids: &[&str]) -> Self {
        let records = ids
            .iter()
            .map(|id| (id.to_string(), sample_record(id)))
            .collect();
        Self {
            ids: ids.iter().map(|id| id.to_string()).collect(),
            records: Arc::new(records),
            failing: Arc::new(HashSet::new()),
            delays: Arc::new(HashMap::new()),
            default_delay: Duration::ZERO,
            list_delay: Duration::ZERO,
            list_error: None,
            counters: Arc::new(MockCounters::default()),
        }
    }

    /// Makes `get_dataset` fail for the given ids.
    pub fn with_failing(mut self, ids: &[&str]) -> Self {
        self.failing = Arc::new(ids.iter().map(|id| id.to_string()).collect());
        self
    }

    /// Delays every fetch by `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    /// Delays the fetch of one id.
    pub fn with_delays(mut self, delays: &[(&str, u64)]) -> Self {
        self.delays = Arc::new(
            delays
                .iter()
                .map(|(id, ms)| (id.to_string(), Duration::from_millis(*ms)))
                .collect(),
        );
        self
    }

    /// Delays the listing call.
    pub fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = delay;
        self
    }

    /// Makes the listing fail as a non-JSON response would.
    pub fn with_protocol_error(mut self, content_type: &str) -> Self {
        self.list_error = Some((
            format!("{}api/action/package_list", TEST_PORTAL_URL),
            content_type.to_string(),
        ));
        self
    }

    pub fn fetch_calls(&self) -> usize {
        self.counters.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.counters.max_in_flight.load(Ordering::SeqCst)
    }
}

impl PortalClient for MockPortalClient {
    fn base_url(&self) -> &str {
        TEST_PORTAL_URL
    }

    async fn list_dataset_ids(&self) -> Result<Vec<String>, AppError> {
        self.counters.list_calls.fetch_add(1, Ordering::SeqCst);
        if !self.list_delay.is_zero() {
            tokio::time::sleep(self.list_delay).await;
        }
        match &self.list_error {
            Some((url, content_type)) => Err(AppError::ProtocolError {
                url: url.clone(),
                content_type: content_type.clone(),
            }),
            None => Ok(self.ids.clone()),
        }
    }

    async fn get_dataset(&self, id: &str) -> Result<RawRecord, AppError> {
        self.counters.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self.delays.get(id).copied().unwrap_or(self.default_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.counters.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(id) {
            return Err(AppError::fetch(
                id,
                AppError::ClientError("HTTP 500 from mock".to_string()),
            ));
        }

        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::fetch(id, AppError::Generic("no result".to_string())))
    }
}

// =============================================================================
// RecordingReporter
// =============================================================================

/// Reporter that keeps a textual trace of every event.
#[derive(Default, Clone)]
pub struct RecordingReporter {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }
}

impl ProgressReporter for RecordingReporter {
    fn report(&self, event: LoaderEvent<'_>) {
        let line = match event {
            LoaderEvent::Started { portal_url } => format!("started {}", portal_url),
            LoaderEvent::DatasetIdsListed { count } => format!("listed {}", count),
            LoaderEvent::DatasetRendered { current, total } => {
                format!("rendered {}/{}", current, total)
            }
            LoaderEvent::DatasetFailed { dataset_id, .. } => format!("failed {}", dataset_id),
            LoaderEvent::Cancelled { rendered, total } => {
                format!("cancelled {}/{}", rendered, total)
            }
            LoaderEvent::Completed { rendered, failed } => {
                format!("completed {} {}", rendered, failed)
            }
        };
        self.events.lock().unwrap().push(line);
    }
}
