//! Loader service: list, fetch concurrently, render.
//!
//! [`LoaderService`] is generic over [`PortalClient`]. A load:
//! 1. lists every dataset identifier once,
//! 2. fetches each dataset through a pool of at most
//!    [`LoaderConfig::concurrency`] in-flight requests,
//! 3. renders each record as soon as its fetch completes.
//!
//! Documents come back in completion order, not listing order. Identifiers
//! are not deduplicated: N identifiers produce N fetches.
//!
//! # Failure Policy
//!
//! With [`FailurePolicy::FailFast`] (the default) the first failed fetch
//! aborts the load and is returned as the error; the remaining in-flight
//! requests are dropped. With [`FailurePolicy::Collect`] failures are
//! recorded in the [`LoadReport`] and the load continues.
//!
//! # Cancellation Support
//!
//! [`load_cancellable`](LoaderService::load_cancellable) accepts a
//! `CancellationToken`. Once it fires, a pending listing is abandoned, no new
//! fetches start, in-flight ones are dropped, and the documents rendered so
//! far are returned in a report flagged `cancelled`.

use std::pin::pin;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::config::{FailurePolicy, LoaderConfig};
use crate::document::{DocumentBuilder, RenderedDocument};
use crate::error::AppError;
use crate::progress::{LoaderEvent, ProgressReporter, SilentReporter};
use crate::schema::DocumentSchema;
use crate::traits::PortalClient;

/// Outcome of a load.
#[derive(Debug)]
pub struct LoadReport {
    /// Rendered documents, in completion order.
    pub documents: Vec<RenderedDocument>,
    /// Fetch failures; only populated under [`FailurePolicy::Collect`].
    pub failures: Vec<AppError>,
    /// Number of identifiers returned by the listing.
    pub total: usize,
    /// Whether the load stopped early because it was cancelled.
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl LoadReport {
    /// Returns true when every listed dataset was rendered.
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.failures.is_empty() && self.documents.len() == self.total
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    fn cancelled_empty(started_at: DateTime<Utc>) -> Self {
        Self {
            documents: Vec::new(),
            failures: Vec::new(),
            total: 0,
            cancelled: true,
            started_at,
            finished_at: Utc::now(),
        }
    }
}

/// Service that turns a portal catalogue into rendered documents.
///
/// # Example
///
/// ```ignore
/// use ckan_loader_core::LoaderService;
///
/// let loader = LoaderService::new(ckan_client);
/// let documents = loader.load().await?;
/// println!("Loaded {} documents", documents.len());
/// ```
pub struct LoaderService<C>
where
    C: PortalClient,
{
    client: C,
    config: LoaderConfig,
    schema: DocumentSchema,
}

impl<C> Clone for LoaderService<C>
where
    C: PortalClient,
{
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            config: self.config.clone(),
            schema: self.schema.clone(),
        }
    }
}

impl<C> LoaderService<C>
where
    C: PortalClient,
{
    /// Creates a loader with default configuration and the Données Québec schema.
    pub fn new(client: C) -> Self {
        Self::with_config(client, LoaderConfig::default())
    }

    /// Creates a loader with custom configuration.
    pub fn with_config(client: C, config: LoaderConfig) -> Self {
        Self {
            client,
            config,
            schema: DocumentSchema::default(),
        }
    }

    /// Replaces the document schema handed to consumers.
    pub fn with_schema(mut self, schema: DocumentSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Description of the documents this loader produces.
    pub fn schema(&self) -> &DocumentSchema {
        &self.schema
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn builder(&self) -> DocumentBuilder {
        DocumentBuilder::new().drop_placeholders(self.config.drop_placeholders)
    }

    /// Loads every dataset of the portal.
    ///
    /// Under [`FailurePolicy::Collect`] failed datasets are omitted from the
    /// returned collection; use [`load_with_progress`](Self::load_with_progress)
    /// to inspect them.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails (e.g. [`AppError::ProtocolError`])
    /// or, under [`FailurePolicy::FailFast`], if any dataset fetch fails.
    pub async fn load(&self) -> Result<Vec<RenderedDocument>, AppError> {
        let report = self.load_with_progress(&SilentReporter).await?;
        Ok(report.documents)
    }

    /// Loads every dataset, emitting progress events through `reporter`.
    pub async fn load_with_progress<R: ProgressReporter>(
        &self,
        reporter: &R,
    ) -> Result<LoadReport, AppError> {
        self.load_cancellable(reporter, CancellationToken::new())
            .await
    }

    /// Loads every dataset with cancellation support.
    pub async fn load_cancellable<R: ProgressReporter>(
        &self,
        reporter: &R,
        cancel_token: CancellationToken,
    ) -> Result<LoadReport, AppError> {
        let started_at = Utc::now();
        let portal_url = self.client.base_url();
        reporter.report(LoaderEvent::Started { portal_url });

        let listing = cancel_token.run_until_cancelled(self.client.list_dataset_ids());
        let ids = match listing.await {
            Some(result) if !cancel_token.is_cancelled() => result?,
            _ => {
                tracing::info!(portal = portal_url, "Load cancelled before listing completed");
                reporter.report(LoaderEvent::Cancelled {
                    rendered: 0,
                    total: 0,
                });
                return Ok(LoadReport::cancelled_empty(started_at));
            }
        };
        let total = ids.len();
        tracing::info!(portal = portal_url, count = total, "Listed dataset ids");
        reporter.report(LoaderEvent::DatasetIdsListed { count: total });

        let builder = self.builder();
        let client = &self.client;
        let report_interval = std::cmp::max(total / 20, 50);

        let mut documents = Vec::with_capacity(total);
        let mut failures = Vec::new();
        let mut processed = 0usize;

        let mut fetched = pin!(
            stream::iter(ids)
                .map(|id| async move {
                    let result = client.get_dataset(&id).await;
                    result.map_err(|e| AppError::fetch(id, e))
                })
                .buffer_unordered(self.config.concurrency.max(1))
                .take_until(cancel_token.cancelled())
        );

        while let Some(result) = fetched.next().await {
            processed += 1;
            match result {
                Ok(record) => documents.push(builder.build(&record)),
                Err(e) => {
                    reporter.report(LoaderEvent::DatasetFailed {
                        dataset_id: e.dataset_id().unwrap_or_default(),
                        error: &e,
                    });
                    match self.config.failure_policy {
                        FailurePolicy::FailFast => return Err(e),
                        FailurePolicy::Collect => failures.push(e),
                    }
                }
            }

            if processed % report_interval == 0 || processed == total {
                reporter.report(LoaderEvent::DatasetRendered {
                    current: processed,
                    total,
                });
            }
        }

        let cancelled = processed < total && cancel_token.is_cancelled();
        if cancelled {
            reporter.report(LoaderEvent::Cancelled {
                rendered: documents.len(),
                total,
            });
        } else {
            reporter.report(LoaderEvent::Completed {
                rendered: documents.len(),
                failed: failures.len(),
            });
        }

        Ok(LoadReport {
            documents,
            failures,
            total,
            cancelled,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Fetches and renders a single dataset.
    pub async fn load_one(&self, id: &str) -> Result<RenderedDocument, AppError> {
        let record = self
            .client
            .get_dataset(id)
            .await
            .map_err(|e| AppError::fetch(id, e))?;
        Ok(self.builder().build(&record))
    }
}
