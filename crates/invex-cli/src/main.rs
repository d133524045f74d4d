//! `invex` - find total, net and VAT amounts in invoice text.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{batch, config, process};

/// Environment variable overriding the `-v` log filter, e.g. `invex_core=trace`.
const LOG_ENV: &str = "INVEX_LOG";

/// Invoice amount extraction - find total, net and VAT amounts in invoice text
#[derive(Parser)]
#[command(name = "invex")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file instead of `<config dir>/invex/config.json`
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract invoice data from a single text file
    Process(process::ProcessArgs),

    /// Extract invoice data from multiple text files
    Batch(batch::BatchArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Log filter for a `-v` count: warnings only by default.
fn log_filter(verbose: u8) -> EnvFilter {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("invex={level},invex_core={level}")))
}

/// Install the stderr subscriber; stdout carries extraction output only.
fn init_logging(verbose: u8) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Process(args) => process::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path).await,
    }
}
