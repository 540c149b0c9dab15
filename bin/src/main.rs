//! Foresight CLI binary.
//!
//! Provides the command-line interface for the walk-forward research pipeline.

mod cmd;
mod data;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "foresight")]
#[command(about = "Walk-forward equity signal research", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where prices come from and how the run is configured.
#[derive(Args, Debug, Clone)]
pub(crate) struct SourceArgs {
    /// FRED series id
    #[arg(long, default_value = foresight::fred::DEFAULT_SERIES_ID)]
    pub(crate) series: String,

    /// First observation date (YYYY-MM-DD)
    #[arg(long, default_value = data::DEFAULT_START)]
    pub(crate) start: String,

    /// Last observation date (YYYY-MM-DD, defaults to latest)
    #[arg(long)]
    pub(crate) end: Option<String>,

    /// Read prices from a CSV file with date and close columns instead of FRED
    #[arg(long)]
    pub(crate) prices: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the walk-forward pipeline with backtest and equity simulation
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// Write the signal log as CSV
        #[arg(long)]
        signals_out: Option<PathBuf>,

        /// Write the gated equity curve as CSV
        #[arg(long)]
        equity_out: Option<PathBuf>,

        /// Write the always-buy baseline curve as CSV
        #[arg(long)]
        baseline_out: Option<PathBuf>,
    },

    /// Run the windowed backtest only
    Backtest {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List the features of the trend feature set
    Features {
        /// Show descriptions and warm-up lengths
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            source,
            signals_out,
            equity_out,
            baseline_out,
        } => {
            cmd::run::run_research(&source, signals_out, equity_out, baseline_out).await?;
        }
        Commands::Backtest { source, format } => {
            cmd::backtest::run_backtest(&source, &format).await?;
        }
        Commands::Features { verbose } => {
            cmd::features::list_features(verbose);
        }
    }

    Ok(())
}
