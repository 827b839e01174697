//! Session replay entry point (native).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use versemark_app::{AppConfig, AppError, AppResult, Annotator, ShortcutRegistry, parse_session, replay_session};
use versemark_core::storage::FileStore;

/// Replay a recorded annotation session against a file-backed store.
#[derive(Debug, Parser)]
#[command(name = "versemark", version, about, after_help = ShortcutRegistry::help())]
struct Cli {
    /// JSON array of session events.
    session: PathBuf,
    /// Application config (JSON).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the active document's raster here as PNG.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn run(cli: Cli) -> AppResult<()> {
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let store = match &config.storage_dir {
        Some(dir) => FileStore::new(dir.clone())?,
        None => FileStore::default_location()?,
    };
    log::info!("Annotations stored in {}", store.base_path().display());

    let json = std::fs::read_to_string(&cli.session)
        .map_err(|e| AppError::Io(format!("{}: {}", cli.session.display(), e)))?;
    let events = parse_session(&json)?;

    let mut annotator = Annotator::new(&config, store);
    let report = replay_session(&mut annotator, &events);
    log::info!(
        "Applied {} event(s), {} failed; history {} / redo {}; {} tab(s); {} stroke(s) on the active document",
        report.applied,
        report.failed,
        report.history_len,
        report.redo_len,
        report.tabs,
        report.strokes
    );

    if let Some(out) = &cli.out {
        match annotator.export_png()? {
            Some(png) => {
                std::fs::write(out, png).map_err(|e| AppError::Io(format!("{}: {}", out.display(), e)))?;
                log::info!("Wrote {}", out.display());
            }
            None => log::warn!("No active document to export"),
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting Versemark");

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
