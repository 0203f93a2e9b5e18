//! CKAN Loader Core - Domain types, document rendering and the loader service.
//!
//! This crate provides the portal-independent part of the loader:
//!
//! - **Rendering**: [`DocumentBuilder`] turns a raw CKAN record into a
//!   French [`RenderedDocument`] with flat metadata
//! - **Translation**: [`i18n::translate`] maps controlled-vocabulary codes to French labels
//! - **Schema**: [`DocumentSchema`] describes the documents for query construction
//! - **Services**: [`LoaderService`] lists, fetches concurrently, and renders
//! - **Traits**: [`PortalClient`] abstracts portal access (e.g., CKAN API)
//! - **Progress reporting**: [`ProgressReporter`] trait for decoupled logging/UI
//!
//! # Example
//!
//! ```ignore
//! use ckan_loader_core::{LoaderConfig, LoaderService, TracingReporter};
//!
//! let loader = LoaderService::with_config(client, LoaderConfig::default().with_concurrency(8));
//! let report = loader.load_with_progress(&TracingReporter).await?;
//! println!("{} documents", report.documents.len());
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod i18n;
pub mod loader;
pub mod progress;
pub mod schema;
pub mod traits;

// Configuration
pub use config::{
    DEFAULT_PORTAL_URL, FailurePolicy, HttpConfig, LoaderConfig, PortalEntry, PortalsConfig,
    default_config_path, load_portals_config,
};

// Error handling
pub use error::AppError;

// Documents
pub use document::{
    DocumentBuilder, Metadata, PLACEHOLDER, RawRecord, RenderedDocument, build_document,
};
pub use export::{ExportFormat, write_documents};
pub use i18n::{VocabularyField, translate};
pub use schema::{AttributeInfo, AttributeType, DocumentSchema};

// Progress reporting
pub use progress::{LoaderEvent, ProgressReporter, SilentReporter, TracingReporter};

// Traits for dependency injection
pub use traits::PortalClient;

// Services
pub use loader::{LoadReport, LoaderService};
