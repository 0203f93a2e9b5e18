//! Trait definitions for external dependencies.
//!
//! The loader is generic over [`PortalClient`] so the orchestration logic can
//! be exercised against in-memory mocks, and so other catalogue APIs can be
//! plugged in without touching the rendering code.

use std::future::Future;

use crate::AppError;
use crate::document::RawRecord;

/// Client for accessing an open data portal.
///
/// Implementations fetch dataset identifiers and raw dataset records.
pub trait PortalClient: Send + Sync + Clone {
    /// Returns the portal base URL, for logging.
    fn base_url(&self) -> &str;

    /// Lists every dataset identifier known to the portal.
    fn list_dataset_ids(&self) -> impl Future<Output = Result<Vec<String>, AppError>> + Send;

    /// Fetches the full record of one dataset.
    ///
    /// Failures are reported as [`AppError::FetchError`] carrying `id`.
    fn get_dataset(&self, id: &str) -> impl Future<Output = Result<RawRecord, AppError>> + Send;
}
