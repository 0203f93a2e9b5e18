use thiserror::Error;

/// Application-wide error types.
///
/// This enum represents all possible errors that can occur while listing,
/// fetching and rendering catalogue records. It uses the `thiserror` crate
/// for ergonomic error handling and automatic conversion from underlying
/// library errors.
///
/// # Error Conversion
///
/// Some errors automatically convert from their source types using the `#[from]` attribute:
/// - `serde_json::Error` → `AppError::SerializationError`
/// - `std::io::Error` → `AppError::Io`
///
/// # Examples
///
/// ```
/// use ckan_loader_core::error::AppError;
///
/// fn example() -> Result<(), AppError> {
///     Err(AppError::Generic("Something went wrong".to_string()))
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// The listing endpoint did not answer with JSON.
    ///
    /// Raised when the `Content-Type` of the `package_list` response does not
    /// contain `application/json`. Never retried.
    #[error("Invalid content type {content_type} from {url}")]
    ProtocolError { url: String, content_type: String },

    /// A single dataset could not be fetched or decoded.
    ///
    /// Carries the dataset identifier and the underlying cause.
    #[error("Failed to fetch dataset '{id}': {source}")]
    FetchError {
        id: String,
        #[source]
        source: Box<AppError>,
    },

    /// HTTP client request failed.
    ///
    /// This error occurs when HTTP requests fail or return a non-success
    /// status code.
    #[error("API Client error: {0}")]
    ClientError(String),

    /// JSON serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Invalid CKAN portal URL provided.
    #[error("Invalid CKAN portal URL: {0}")]
    InvalidPortalUrl(String),

    /// Network or connection error.
    ///
    /// DNS resolution failures, refused connections, unreachable hosts.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Configuration file error.
    ///
    /// This error occurs when reading or parsing the configuration file fails,
    /// such as when the portals.toml file is malformed or contains invalid values.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Writing exported documents failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic application error for cases not covered by specific variants.
    #[error("Error: {0}")]
    Generic(String),
}

impl AppError {
    /// Wraps an error as the cause of a failed dataset fetch.
    ///
    /// Errors that already are [`AppError::FetchError`] are returned as-is so
    /// the identifier is never nested twice.
    pub fn fetch(id: impl Into<String>, source: AppError) -> Self {
        match source {
            err @ AppError::FetchError { .. } => err,
            other => AppError::FetchError {
                id: id.into(),
                source: Box::new(other),
            },
        }
    }

    /// Returns the dataset identifier for fetch errors.
    pub fn dataset_id(&self) -> Option<&str> {
        match self {
            AppError::FetchError { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Returns a user-friendly error message suitable for CLI output.
    pub fn user_message(&self) -> String {
        match self {
            AppError::ProtocolError { url, content_type } => {
                format!(
                    "The portal did not return JSON (got '{}') from {}.\n   Check that the URL points to a CKAN portal.",
                    content_type, url
                )
            }
            AppError::FetchError { id, source } => {
                format!(
                    "Could not load dataset '{}': {}",
                    id,
                    source.user_message()
                )
            }
            AppError::ClientError(msg) => {
                if msg.contains("timeout") || msg.contains("timed out") {
                    "Request timed out. The portal may be slow or unreachable.\n   Try again later or check the portal URL.".to_string()
                } else if msg.contains("connect") {
                    format!("Cannot connect to portal: {}\n   Check your internet connection and the portal URL.", msg)
                } else {
                    format!("API error: {}", msg)
                }
            }
            AppError::InvalidPortalUrl(url) => {
                format!(
                    "Invalid portal URL: {}\n   Example: https://www.donneesquebec.ca/recherche/",
                    url
                )
            }
            AppError::NetworkError(msg) => {
                format!("Network error: {}\n   Check your internet connection.", msg)
            }
            AppError::Timeout(secs) => {
                format!(
                    "Request timed out after {} seconds.\n   The portal may be overloaded. Try again later or raise the timeout.",
                    secs
                )
            }
            AppError::ConfigError(msg) => {
                format!(
                    "Configuration error: {}\n   Check your configuration file.",
                    msg
                )
            }
            _ => self.to_string(),
        }
    }
}
