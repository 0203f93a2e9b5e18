use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ckan_loader::{Command, Config, ExportFormat};
use ckan_loader_client::CkanClient;
use ckan_loader_core::{
    DEFAULT_PORTAL_URL, DocumentSchema, FailurePolicy, HttpConfig, LoadReport, LoaderConfig,
    LoaderService, PortalClient, PortalEntry, TracingReporter, load_portals_config, write_documents,
};

/// Portal selected for this run.
struct ResolvedPortal {
    url: String,
    schema: DocumentSchema,
}

impl From<&PortalEntry> for ResolvedPortal {
    fn from(entry: &PortalEntry) -> Self {
        Self {
            url: entry.url.clone(),
            schema: entry.schema(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let config = Config::parse();
    let portal = resolve_portal(&config)?;

    match config.command {
        Command::List => {
            let client = CkanClient::new(&portal.url)?;
            let ids = client.list_package_ids().await?;
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            for id in &ids {
                writeln!(writer, "{}", id)?;
            }
            info!("{} datasets listed from {}", ids.len(), portal.url);
        }
        Command::Show { id } => {
            let client = CkanClient::new(&portal.url)?;
            let loader = LoaderService::new(client);
            let document = loader.load_one(&id).await?;
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Command::Load {
            format,
            output,
            concurrency,
            keep_going,
            drop_placeholders,
            request_timeout,
        } => {
            let http_config =
                HttpConfig::default().with_request_timeout(Duration::from_secs(request_timeout));
            let client = CkanClient::with_config(&portal.url, http_config)?;

            let mut loader_config = LoaderConfig::default().with_drop_placeholders(drop_placeholders);
            if let Some(n) = concurrency {
                loader_config = loader_config.with_concurrency(n);
            }
            if keep_going {
                loader_config = loader_config.with_failure_policy(FailurePolicy::Collect);
            }

            info!(
                "Loading {} (concurrency: {}, policy: {})",
                portal.url, loader_config.concurrency, loader_config.failure_policy
            );

            let loader =
                LoaderService::with_config(client, loader_config).with_schema(portal.schema);
            load(&loader, format, output).await?;
        }
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&portal.schema)?);
        }
    }

    Ok(())
}

/// Picks the portal: explicit URL, named entry, first enabled entry, then the default.
fn resolve_portal(config: &Config) -> anyhow::Result<ResolvedPortal> {
    if let Some(url) = &config.portal_url {
        return Ok(ResolvedPortal {
            url: url.clone(),
            schema: DocumentSchema::quebec(),
        });
    }

    let portals_config = load_portals_config(config.config.clone())?;

    match (&config.portal, portals_config) {
        (Some(name), Some(portals_config)) => {
            let entry = portals_config
                .find_by_name(name)
                .ok_or_else(|| anyhow::anyhow!("Portal '{}' not found in configuration", name))?;
            if !entry.enabled {
                info!(
                    "Note: Portal '{}' is marked as disabled in configuration",
                    name
                );
            }
            Ok(entry.into())
        }
        (Some(_), None) => Err(anyhow::anyhow!(
            "No configuration file found. Create ~/.config/ckan-loader/portals.toml or use --config"
        )),
        (None, Some(portals_config)) => Ok(portals_config
            .enabled_portals()
            .first()
            .map(|entry| ResolvedPortal::from(*entry))
            .unwrap_or_else(default_portal)),
        (None, None) => Ok(default_portal()),
    }
}

fn default_portal() -> ResolvedPortal {
    ResolvedPortal {
        url: DEFAULT_PORTAL_URL.to_string(),
        schema: DocumentSchema::quebec(),
    }
}

async fn load(
    loader: &LoaderService<CkanClient>,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let cancel_token = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel_token.clone()));

    let report = loader
        .load_cancellable(&TracingReporter, cancel_token)
        .await?;

    let written = match &output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_documents(&mut writer, &report.documents, format.into())?
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            write_documents(&mut writer, &report.documents, format.into())?
        }
    };

    print_load_summary(loader.client().base_url(), &report, written);
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM, then cancel the load.
async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    warn!("Interrupt received, stopping load and writing loaded documents...");
    cancel_token.cancel();
}

fn print_load_summary(portal_url: &str, report: &LoadReport, written: u64) {
    let elapsed = report.finished_at - report.started_at;

    info!("");
    info!("═══════════════════════════════════════════════════════");
    if report.cancelled {
        info!("Load cancelled: {}", portal_url);
    } else {
        info!("Load complete: {}", portal_url);
    }
    info!("═══════════════════════════════════════════════════════");
    info!("  Listed:              {}", report.total);
    info!("  Rendered:            {}", report.documents.len());
    info!("  ✗ Failed:            {}", report.failed_count());
    info!("  Written:             {}", written);
    info!("  Elapsed:             {}s", elapsed.num_seconds());
    info!("═══════════════════════════════════════════════════════");

    if report.failed_count() > 0 {
        info!("Failed datasets:");
        for failure in &report.failures {
            error!("  - {}", failure);
        }
    } else if report.is_complete() {
        info!("All datasets rendered successfully!");
    }
}
