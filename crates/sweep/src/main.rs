//! Sweep CLI - helpdesk attachment retention.
//!
//! Provides commands for:
//! - `run`: Delete (or dry-run log) attachments of long-closed tickets
//! - `config`: Show the effective configuration

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::run::LogFormat;
use commands::{ConfigArgs, RunArgs};
use error::error_chain;
use output::Output;

/// Sweep - helpdesk attachment retention.
#[derive(Parser)]
#[command(name = "sweep", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one retention sweep.
    Run(RunArgs),
    /// Show the effective configuration.
    Config(ConfigArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let (verbose, log_format) = match &cli.command {
        Commands::Run(args) => (args.verbose, args.log_format),
        Commands::Config(_) => (false, LogFormat::Text),
    };
    init_tracing(verbose, log_format);

    let result = match cli.command {
        Commands::Run(args) => args.execute(),
        Commands::Config(args) => args.execute(),
    };

    if let Err(err) = result {
        tracing::error!(error = %err, "sweep failed");
        output.error(&format!("Error: {}", error_chain(&err)));
        if err.is_retryable() {
            output.warning("The failure looks transient; the sweep is safe to re-run later.");
        }
        std::process::exit(1);
    }
}

/// Filter used when neither `--verbose` nor `RUST_LOG` is given.
///
/// Keeps the per-attachment decisions and the run summary visible.
const DEFAULT_DIRECTIVES: &str = "warn,sweep_helpdesk::sweeper=info";

/// Initialize tracing on stderr.
///
/// `--verbose` enables INFO level everywhere, otherwise use `RUST_LOG` or
/// [`DEFAULT_DIRECTIVES`].
fn init_tracing(verbose: bool, format: LogFormat) {
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
