//! Configuration types for the loader components.
//!
//! Defaults are hardcoded here; the CLI overrides them from flags and
//! environment variables, and `portals.toml` names the portals to load.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;
use crate::schema::DocumentSchema;

/// Portal loaded when none is given.
pub const DEFAULT_PORTAL_URL: &str = "https://www.donneesquebec.ca/recherche/";

/// HTTP client configuration for portal API calls.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Timeout for the `package_list` call.
    pub list_timeout: Duration,
    /// Timeout for each `package_show` call.
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            list_timeout: Duration::from_secs(20),
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("ckan-loader/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpConfig {
    /// Overrides the per-dataset request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// What the loader does when a single dataset fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Abort the whole load on the first failure (default).
    #[default]
    FailFast,
    /// Record the failure in the report and keep going.
    Collect,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FailFast => write!(f, "fail-fast"),
            Self::Collect => write!(f, "collect"),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail-fast" | "failfast" => Ok(Self::FailFast),
            "collect" => Ok(Self::Collect),
            _ => Err(AppError::ConfigError(format!(
                "Unknown failure policy: '{}'. Valid options: fail-fast, collect",
                s
            ))),
        }
    }
}

/// Default fetch pool size: the available parallelism plus four, capped at 32.
pub fn default_concurrency() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (cpus + 4).min(32)
}

/// Loader configuration.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Maximum number of concurrent `package_show` requests.
    pub concurrency: usize,
    pub failure_policy: FailurePolicy,
    /// Drop `"_"` placeholder entries from document metadata.
    pub drop_placeholders: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            failure_policy: FailurePolicy::default(),
            drop_placeholders: false,
        }
    }
}

impl LoaderConfig {
    /// Sets the fetch pool size (at least 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_drop_placeholders(mut self, drop: bool) -> Self {
        self.drop_placeholders = drop;
        self
    }
}

// =============================================================================
// Portal Configuration (portals.toml)
// =============================================================================

/// Default enabled status when not specified in configuration.
fn default_enabled() -> bool {
    true
}

/// Root configuration structure for portals.toml.
///
/// # Example
///
/// ```toml
/// [[portals]]
/// name = "quebec"
/// url = "https://www.donneesquebec.ca/recherche/"
/// description = "Données Québec"
///
/// [[portals]]
/// name = "montreal"
/// url = "https://donnees.montreal.ca/"
/// document_description = "Les métadonnées des jeux de données de la Ville de Montréal."
/// enabled = false
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalsConfig {
    /// Array of portal configurations.
    pub portals: Vec<PortalEntry>,
}

impl PortalsConfig {
    /// Returns only enabled portals.
    pub fn enabled_portals(&self) -> Vec<&PortalEntry> {
        self.portals.iter().filter(|p| p.enabled).collect()
    }

    /// Find a portal by name (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<&PortalEntry> {
        self.portals
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

/// A single portal entry in the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalEntry {
    /// Human-readable portal name, used for `--portal <name>` lookup and logging.
    pub name: String,

    /// Base URL of the CKAN portal, including any path prefix before `/api`.
    ///
    /// Example: "<https://www.donneesquebec.ca/recherche/>"
    pub url: String,

    /// Whether this portal is enabled. Defaults to `true`.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Optional description of the portal.
    pub description: Option<String>,

    /// Overrides the document content description of the schema.
    pub document_description: Option<String>,
}

impl PortalEntry {
    /// The document schema for this portal.
    pub fn schema(&self) -> DocumentSchema {
        match &self.document_description {
            Some(info) => DocumentSchema::quebec().with_content_info(info.clone()),
            None => DocumentSchema::quebec(),
        }
    }
}

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "portals.toml";

/// Returns the default configuration directory path: `~/.config/ckan-loader/`
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ckan-loader"))
}

/// Returns the default configuration file path.
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|p| p.join(CONFIG_FILE_NAME))
}

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# ckan-loader portal configuration
#
# Usage:
#   ckan-loader load                      # Load the first enabled portal
#   ckan-loader --portal quebec load      # Load a specific portal by name
#   ckan-loader --portal-url https://... load
#
# url is the portal base URL, including any path before /api.
# document_description overrides the schema's content description.

[[portals]]
name = "quebec"
url = "https://www.donneesquebec.ca/recherche/"
description = "Données Québec"
"#;

/// Load portal configuration from a TOML file.
///
/// # Returns
/// * `Ok(Some(config))` - Configuration loaded successfully
/// * `Ok(None)` - No configuration file found at the default path
/// * `Err(e)` - Configuration file exists but is invalid, or a custom path does not exist
///
/// If no file exists at the default path, a template is created and loaded.
pub fn load_portals_config(path: Option<PathBuf>) -> Result<Option<PortalsConfig>, AppError> {
    let using_default_path = path.is_none();
    let config_path = match path {
        Some(p) => p,
        None => match default_config_path() {
            Some(p) => p,
            None => return Ok(None),
        },
    };

    if !config_path.exists() {
        if using_default_path {
            if let Err(e) = create_default_config(&config_path) {
                tracing::warn!("Could not create default config template: {}", e);
                return Ok(None);
            }
        } else {
            return Err(AppError::ConfigError(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }
    }

    let content = std::fs::read_to_string(&config_path).map_err(|e| {
        AppError::ConfigError(format!(
            "Failed to read config file '{}': {}",
            config_path.display(),
            e
        ))
    })?;

    let config: PortalsConfig = toml::from_str(&content).map_err(|e| {
        AppError::ConfigError(format!(
            "Invalid TOML in '{}': {}",
            config_path.display(),
            e
        ))
    })?;

    Ok(Some(config))
}

fn create_default_config(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, DEFAULT_CONFIG_TEMPLATE)?;
    tracing::info!("Created default config template at: {}", path.display());

    Ok(())
}
