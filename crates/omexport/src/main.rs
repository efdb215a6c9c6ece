//! Oruxmaps track export - command line entry point

mod settings;

use clap::Parser;
use omexport_lib::{ExportReport, Exporter, OruxStore};
use settings::Settings;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::parse();
    tracing::info!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match run(&settings) {
        Ok(report) => {
            log_report(&report, settings.combined.is_some());
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("Fatal: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(settings: &Settings) -> omexport_lib::Result<ExportReport> {
    #[cfg(feature = "profiling")]
    profiling::scope!("omexport::run");

    let config = settings.export_config();
    let store = OruxStore::open(&settings.database)?;

    // The store is released on every path out of the export
    let result = Exporter::new(&store, &config).run();
    if let Err(err) = store.close() {
        tracing::warn!("Closing {} failed: {err}", settings.database.display());
    }
    result
}

fn log_report(report: &ExportReport, combined: bool) {
    if combined {
        if report.combined_written {
            tracing::info!("Combined file written");
        } else {
            tracing::error!("Combined file could not be written");
        }
        return;
    }
    tracing::info!(
        "Tracks: {} written, {} written under track id, {} skipped, {} failed",
        report.tracks_written,
        report.tracks_degraded,
        report.tracks_skipped,
        report.tracks_failed
    );
    if report.folders_written + report.folders_skipped + report.folders_failed > 0 {
        tracing::info!(
            "Folders: {} written, {} skipped, {} failed",
            report.folders_written,
            report.folders_skipped,
            report.folders_failed
        );
    }
}
