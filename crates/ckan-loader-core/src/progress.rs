//! Progress reporting for the loader.
//!
//! The [`LoaderService`](crate::loader::LoaderService) emits [`LoaderEvent`]s
//! through a [`ProgressReporter`], keeping logging and UI concerns out of the
//! orchestration code.

use tracing::{info, warn};

use crate::error::AppError;

/// Events emitted while loading a portal.
#[derive(Debug, Clone, Copy)]
pub enum LoaderEvent<'a> {
    /// Loading started.
    Started { portal_url: &'a str },
    /// The catalogue listing returned `count` identifiers.
    DatasetIdsListed { count: usize },
    /// Periodic progress update.
    DatasetRendered { current: usize, total: usize },
    /// One dataset could not be fetched.
    DatasetFailed {
        dataset_id: &'a str,
        error: &'a AppError,
    },
    /// Loading was cancelled before completion.
    Cancelled { rendered: usize, total: usize },
    /// Loading finished.
    Completed { rendered: usize, failed: usize },
}

/// Observer of loader events.
pub trait ProgressReporter: Send + Sync {
    /// Called when a loader event occurs.
    ///
    /// The default implementation does nothing (silent mode).
    fn report(&self, event: LoaderEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that ignores all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}

/// Tracing-based reporter for CLI logging.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn report(&self, event: LoaderEvent<'_>) {
        match event {
            LoaderEvent::Started { portal_url } => {
                info!(portal = portal_url, "Listing datasets");
            }
            LoaderEvent::DatasetIdsListed { count } => {
                info!("Found {} dataset ids", count);
            }
            LoaderEvent::DatasetRendered { current, total } => {
                info!(
                    "Progress: {}/{} ({}%)",
                    current,
                    total,
                    progress_percent(current, total)
                );
            }
            LoaderEvent::DatasetFailed { dataset_id, error } => {
                warn!(dataset_id, error = %error, "Failed to load dataset");
            }
            LoaderEvent::Cancelled { rendered, total } => {
                warn!("Load cancelled after {}/{} datasets", rendered, total);
            }
            LoaderEvent::Completed { rendered, failed } => {
                info!(rendered, failed, "Load complete");
            }
        }
    }
}

/// Completion percentage; an empty catalogue counts as done.
fn progress_percent(current: usize, total: usize) -> usize {
    (current * 100).checked_div(total).unwrap_or(100)
}
