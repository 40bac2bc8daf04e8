//! Bramble - session-backed HTTP server
//!
//! Main entry point for the Bramble CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;

mod commands;

use bramble_config::{LoadedConfig, LoggingSection};
use commands::{start, upload};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Bramble - session-backed HTTP server
#[derive(Parser)]
#[command(name = "bramble")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file (overrides default discovery)
    #[arg(long, global = true, env = "BRAMBLE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the Bramble server
    Start(start::StartArgs),

    /// Upload a file to a running server
    Upload(upload::UploadArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => LoadedConfig::from_file(path)?,
        None => bramble_config::load_config(None)?,
    };

    // Keep the guard alive so the file writer flushes on exit.
    let _guard = init_tracing(cli.verbose, &loaded.config.logging());

    // Print warnings (parse errors in discovered layers, etc.)
    for warning in &loaded.warnings {
        eprintln!("warning: {}", warning);
    }

    let ctx = commands::Context {
        config: loaded,
        verbose: cli.verbose,
    };

    // Dispatch to command handlers
    match cli.command {
        Commands::Start(args) => start::run(args, &ctx).await,
        Commands::Upload(args) => upload::run(args, &ctx).await,
    }
}

/// Console (human-readable) plus, when a log directory is configured, a
/// daily-rotated JSON file.
fn init_tracing(verbose: bool, logging: &LoggingSection) -> Option<WorkerGuard> {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let default_filter = if verbose {
        "bramble=debug,bramble_server=debug,bramble_session=debug,bramble_config=debug,tower_http=debug,info"
    } else {
        "bramble=info,bramble_server=info,bramble_session=info,warn"
    };
    let console_filter = logging.filter.as_deref().unwrap_or(default_filter);

    let (file_layer, guard) = match &logging.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "bramble.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(EnvFilter::new(
                    "bramble=trace,bramble_server=trace,bramble_session=trace,bramble_config=trace,info",
                ));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_filter(EnvFilter::new(console_filter)),
        )
        .with(file_layer)
        .init();

    guard
}
