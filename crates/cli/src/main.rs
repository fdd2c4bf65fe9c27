//! ConfSync command-line tool.
//!
//! Runs one propagation cycle from a canonical source tree into a working
//! directory, merging against the persisted backup of the last-seen source.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use confsync_core::coordinator::{RunReport, SyncCoordinator};

/// Propagate a config-file tree into a working directory.
#[derive(Parser, Debug)]
#[command(
    name = "confsync",
    version,
    about = "Sync a canonical config tree into a working directory, preserving local edits"
)]
struct Cli {
    /// Canonical/template tree to propagate from.
    source_dir: PathBuf,

    /// Working directory to propagate into.
    actual_dir: PathBuf,

    /// Path of the backup document holding the last-seen source content.
    #[arg(short, long, default_value = ".confsync-backup.json")]
    backup: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(report) if report.is_clean() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<RunReport> {
    let report = SyncCoordinator::default()
        .run(&cli.source_dir, &cli.actual_dir, &cli.backup)
        .await
        .with_context(|| {
            format!(
                "sync run from '{}' into '{}' failed",
                cli.source_dir.display(),
                cli.actual_dir.display()
            )
        })?;

    println!(
        "synced {} file(s), removed {}, {} failure(s)",
        report.synced.len(),
        report.removed.len(),
        report.failures.len()
    );
    for failure in &report.failures {
        eprintln!("  {}: {}", failure.file_name, failure.error);
    }

    Ok(report)
}
