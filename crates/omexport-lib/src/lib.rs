//! Oruxmaps Export Library - GPX export of Oruxmaps track databases
//!
//! This library reads the tracks recorded by the Oruxmaps app from its SQLite
//! database (`oruxmapstracks.db`) and writes them out as GPX files, one per
//! track, one per folder, or a single combined file.
//!
//! # Architecture
//!
//! - **[`sanitize_filename`]**: Maps display names to filesystem-safe names
//! - **[`TrackSource`]**: Read access to folders, tracks, segments, points and waypoints
//! - **[`OruxStore`]**: SQLite implementation of [`TrackSource`]
//! - **[`assemble`]**: Builds `gpx::Track` values and waypoint lists from store records
//! - **[`GpxWriter`]**: Persists documents with id-only fallback naming and timestamp restoration
//! - **[`Exporter`]**: Walks folders and tracks and decides what to (re)generate
//!
//! # Usage Example
//!
//! ```no_run
//! use omexport_lib::{ExportConfig, Exporter, OruxStore};
//!
//! # fn main() -> omexport_lib::Result<()> {
//! let store = OruxStore::open("oruxmapstracks.db")?;
//! let config = ExportConfig::individual("tracks");
//! let report = Exporter::new(&store, &config).run()?;
//! println!("{} files written", report.files_touched());
//! # Ok(())
//! # }
//! ```

pub mod assemble;
mod planner;
mod sanitize;
mod store;
mod writer;

#[cfg(test)]
mod test_support;

// Public API exports
pub use planner::{ExportConfig, ExportMode, ExportReport, Exporter};
pub use sanitize::{NO_NAME, sanitize_filename};
pub use store::{Folder, OruxStore, Point, Poi, TrackData, TrackRecord, TrackSource};
pub use writer::{GpxWriter, WriteError, WriteOutcome, restore_timestamp};

use std::path::PathBuf;

/// Fatal errors, aborting the whole export run
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Cannot create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Database error: {0}")]
    Store(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;
