//! Folder Mirror CLI
//!
//! Keeps a replica folder identical to a source folder, one pass every
//! interval, until interrupted.

mod cli;
mod error;
mod logger;
mod options;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use mirror_core::{Scheduler, SyncCycle};
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::Cli;
use error::{CliError, Result};
use logger::LogSink;
use options::RunOptions;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: bool) {
    let result = if verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber).map_err(|e| e.to_string())
    } else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| e.to_string())
    };
    if let Err(e) = result {
        eprintln!("warning: failed to set up diagnostics: {e}");
    }
    tracing::debug!("Verbose mode enabled");
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let cwd = std::env::current_dir()?;
    let options = RunOptions::from_cli(&cli, &cwd)?;
    let settings = options.settings;

    // Usage problems first, then the source folder
    settings.validate()?;
    if !settings.source.is_dir() {
        return Err(CliError::SourceMissing {
            path: settings.source,
        });
    }
    mirror_fs::io::ensure_dir(&settings.replica)?;

    let sink = Arc::new(LogSink::open(&options.log, cli.verbose)?);
    tracing::debug!(
        source = %settings.source.display(),
        replica = %settings.replica.display(),
        interval = ?settings.interval,
        "Starting mirror"
    );

    let mut scheduler = Scheduler::new(Arc::new(SyncCycle::new(settings, sink)));
    if options.once {
        scheduler = scheduler.with_max_passes(1);
    }

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let summary = scheduler.run(cancel).await;

    if options.once && summary.failed_passes > 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
