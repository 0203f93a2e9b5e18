//! CKAN client for reading dataset catalogues from CKAN-compatible open data portals.
//!
//! Two endpoints are used:
//! - `api/action/package_list` lists every dataset identifier in one call
//! - `api/3/action/package_show?id=...` returns the full record of one dataset
//!
//! CKAN API reference: <https://docs.ckan.org/en/2.9/api/>

use std::time::Duration;

use ckan_loader_core::HttpConfig;
use ckan_loader_core::document::RawRecord;
use ckan_loader_core::error::AppError;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use serde_json::Value;

/// Generic wrapper for CKAN API responses.
///
/// CKAN returns `{"success": bool, "result": T}`. Both fields are optional here:
/// a missing `result` is handled by the caller, and `success` is only logged.
#[derive(Deserialize, Debug)]
struct CkanResponse<T> {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    result: Option<T>,
}

/// HTTP client for interacting with CKAN open data portals.
///
/// # Examples
///
/// ```no_run
/// use ckan_loader_client::CkanClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = CkanClient::new("https://www.donneesquebec.ca/recherche/")?;
/// let dataset_ids = client.list_package_ids().await?;
/// println!("Found {} datasets", dataset_ids.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CkanClient {
    client: Client,
    base_url: Url,
    config: HttpConfig,
}

impl CkanClient {
    /// Creates a new CKAN client with default HTTP settings.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidPortalUrl` if the URL is invalid or malformed.
    /// Returns `AppError::ClientError` if the HTTP client cannot be built.
    pub fn new(base_url_str: &str) -> Result<Self, AppError> {
        Self::with_config(base_url_str, HttpConfig::default())
    }

    /// Creates a new CKAN client with custom timeouts and user agent.
    ///
    /// The base URL is normalized to end with `/` so that portals mounted
    /// under a path (e.g. `/recherche`) keep that path when endpoints are joined.
    pub fn with_config(base_url_str: &str, config: HttpConfig) -> Result<Self, AppError> {
        let base_url = parse_base_url(base_url_str)?;

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| AppError::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    pub fn http_config(&self) -> &HttpConfig {
        &self.config
    }

    /// Fetches the complete list of dataset IDs from the CKAN portal.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ProtocolError` if the response is not `application/json`.
    /// Returns `AppError::ClientError` on a non-2xx status or undecodable body.
    /// Returns `AppError::Timeout` / `AppError::NetworkError` on transport failures.
    pub async fn list_package_ids(&self) -> Result<Vec<String>, AppError> {
        let url = self
            .base_url
            .join("api/action/package_list")
            .map_err(|e| AppError::Generic(e.to_string()))?;

        let resp = self.get(&url, self.config.list_timeout).await?;

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("<missing>")
            .to_string();
        if !content_type.contains("application/json") {
            return Err(AppError::ProtocolError {
                url: url.to_string(),
                content_type,
            });
        }

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::ClientError(format!(
                "HTTP {} from {}",
                status.as_u16(),
                url
            )));
        }

        let ckan_resp: CkanResponse<Vec<String>> = resp
            .json()
            .await
            .map_err(|e| AppError::ClientError(e.to_string()))?;

        if ckan_resp.success == Some(false) {
            tracing::warn!(url = %url, "CKAN package_list returned success: false");
        }

        let ids = ckan_resp.result.unwrap_or_default();
        tracing::debug!(url = %url, count = ids.len(), "Fetched package list");
        Ok(ids)
    }

    /// Fetches the full record of a specific dataset by ID.
    ///
    /// Every failure is wrapped in `AppError::FetchError` carrying `id`.
    pub async fn show_package(&self, id: &str) -> Result<RawRecord, AppError> {
        self.fetch_package(id)
            .await
            .map_err(|e| AppError::fetch(id, e))
    }

    async fn fetch_package(&self, id: &str) -> Result<RawRecord, AppError> {
        let mut url = self
            .base_url
            .join("api/3/action/package_show")
            .map_err(|e| AppError::Generic(e.to_string()))?;

        url.query_pairs_mut().append_pair("id", id);

        let resp = self.get(&url, self.config.request_timeout).await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::ClientError(format!(
                "HTTP {} from {}",
                status.as_u16(),
                url
            )));
        }

        let ckan_resp: CkanResponse<Value> = resp
            .json()
            .await
            .map_err(|e| AppError::ClientError(e.to_string()))?;

        match ckan_resp.result {
            Some(Value::Object(record)) => Ok(record),
            Some(Value::Null) | None => Err(AppError::ClientError(
                "package_show response has no result".to_string(),
            )),
            Some(other) => Err(AppError::ClientError(format!(
                "package_show result is not an object: {}",
                other
            ))),
        }
    }

    async fn get(&self, url: &Url, timeout: Duration) -> Result<Response, AppError> {
        self.client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(timeout.as_secs())
                } else if e.is_connect() {
                    AppError::NetworkError(format!("Connection failed: {}", e))
                } else {
                    AppError::ClientError(e.to_string())
                }
            })
    }
}

fn parse_base_url(base_url_str: &str) -> Result<Url, AppError> {
    let mut base_url = Url::parse(base_url_str)
        .map_err(|_| AppError::InvalidPortalUrl(base_url_str.to_string()))?;

    if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
        return Err(AppError::InvalidPortalUrl(base_url_str.to_string()));
    }

    if !base_url.path().ends_with('/') {
        let path = format!("{}/", base_url.path());
        base_url.set_path(&path);
    }
    base_url.set_query(None);
    base_url.set_fragment(None);

    Ok(base_url)
}

impl ckan_loader_core::traits::PortalClient for CkanClient {
    fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    async fn list_dataset_ids(&self) -> Result<Vec<String>, AppError> {
        self.list_package_ids().await
    }

    async fn get_dataset(&self, id: &str) -> Result<RawRecord, AppError> {
        self.show_package(id).await
    }
}
