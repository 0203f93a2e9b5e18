//! CKAN Loader Client - HTTP client for CKAN portals
//!
//! This crate provides [`CkanClient`], the [`PortalClient`](ckan_loader_core::PortalClient)
//! implementation that talks to the CKAN action API.
//!
//! # Overview
//!
//! The client handles URL normalization, request timeouts, content-type
//! checks, response parsing, and error classification.

pub mod ckan;

pub use ckan::CkanClient;
