use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI configuration parsed from command line arguments and environment variables
#[derive(Parser, Debug)]
#[command(name = "ckan-loader")]
#[command(
    author,
    version,
    about = "Load CKAN catalogue records as French-language documents"
)]
#[command(after_help = "Examples:
  ckan-loader list
  ckan-loader show qualite-de-l-air
  ckan-loader load --format jsonl --output documents.jsonl
  ckan-loader --portal quebec load --concurrency 8 --keep-going
  ckan-loader schema

Portal resolution:
  --portal-url (or CKAN_PORTAL_URL), then --portal NAME from portals.toml,
  then the first enabled portal in portals.toml, then Données Québec.")]
pub struct Config {
    /// Base URL of the CKAN portal, including any path before /api
    #[arg(long, env = "CKAN_PORTAL_URL", value_name = "URL", global = true)]
    pub portal_url: Option<String>,

    /// Portal name from the configuration file
    #[arg(short, long, value_name = "NAME", global = true)]
    pub portal: Option<String>,

    /// Custom path to portals.toml configuration file
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every dataset identifier of the portal
    List,
    /// Fetch one dataset and print its rendered document as JSON
    #[command(after_help = "Example: ckan-loader show qualite-de-l-air")]
    Show {
        /// Dataset identifier or name slug
        id: String,
    },
    /// Load the whole catalogue and export the rendered documents
    #[command(after_help = "Examples:
  ckan-loader load > documents.jsonl
  ckan-loader load --format json --output documents.json
  ckan-loader load --concurrency 4 --request-timeout 60 --keep-going

Press Ctrl-C to stop early; documents loaded so far are still written.")]
    Load {
        /// Output format for exported documents
        #[arg(short, long, default_value = "jsonl")]
        format: ExportFormat,
        /// Write to this file instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Maximum number of concurrent dataset fetches
        #[arg(long, env = "CKAN_CONCURRENCY")]
        concurrency: Option<usize>,
        /// Record failed datasets and continue instead of aborting
        #[arg(long)]
        keep_going: bool,
        /// Omit metadata entries whose source field is missing
        #[arg(long)]
        drop_placeholders: bool,
        /// Timeout for each dataset request, in seconds
        #[arg(
            long,
            value_name = "SECS",
            default_value_t = 30,
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        request_timeout: u64,
    },
    /// Print the document schema as JSON
    Schema,
}

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// JSON Lines format (one JSON object per line)
    Jsonl,
    /// Standard JSON array format
    Json,
}

impl From<ExportFormat> for ckan_loader_core::ExportFormat {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Jsonl => Self::Jsonl,
            ExportFormat::Json => Self::Json,
        }
    }
}
