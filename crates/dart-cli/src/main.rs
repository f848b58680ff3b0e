//! dart CLI binary.
//!
//! Seeds the corp-code directory and prints filings and derived metrics.

mod cmd;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::cmd::FilingArgs;
use crate::config::{Config, DEFAULT_CORP_DB, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_MARKET_DELAY_MS};

#[derive(Parser)]
#[command(name = "dart")]
#[command(about = "Financial statements and ratios from OpenDART filings", long_about = None)]
#[command(version)]
struct Cli {
    /// OpenDART API key
    #[arg(long, env = "OPEN_DART_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Path of the corp-code database
    #[arg(long, env = "DART_CORP_DB", default_value = DEFAULT_CORP_DB, global = true)]
    corp_db: PathBuf,

    /// HTTP timeout in seconds
    #[arg(long, env = "DART_HTTP_TIMEOUT_SECS", default_value_t = DEFAULT_HTTP_TIMEOUT_SECS, global = true)]
    http_timeout: u64,

    /// Minimum delay between market page requests in milliseconds
    #[arg(long, env = "DART_MARKET_DELAY_MS", default_value_t = DEFAULT_MARKET_DELAY_MS, global = true)]
    market_delay_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for command results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Human-readable table
    Table,
}

#[derive(Subcommand)]
enum Commands {
    /// Load CORPCODE.xml into the corp-code database
    Seed {
        /// Path to the unzipped CORPCODE.xml
        path: PathBuf,
    },

    /// Search corporations by Korean or English name
    Search {
        /// Name fragment
        query: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Fetch the rows of a filing
    Financials {
        #[command(flatten)]
        filing: FilingArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Derive financial ratios and market figures for a filing
    Metrics {
        #[command(flatten)]
        filing: FilingArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Skip the market metrics lookup
        #[arg(long)]
        no_market: bool,
    },
}

#[tokio::main]
async fn main() {
    // Try to load .env file (ignore errors if not found)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::new(cli.api_key, cli.corp_db, cli.http_timeout)
        .with_market_delay(cli.market_delay_ms);

    match cli.command {
        Commands::Seed { path } => {
            cmd::seed::seed_directory(&config, &path).await?;
        }
        Commands::Search { query, format } => {
            cmd::search::search_corps(&config, &query, format).await?;
        }
        Commands::Financials { filing, format } => {
            cmd::financials::show_financials(&config, &filing, format).await?;
        }
        Commands::Metrics {
            filing,
            format,
            no_market,
        } => {
            cmd::metrics::show_metrics(&config, &filing, format, no_market).await?;
        }
    }

    Ok(())
}
