//! Export planning - what gets (re)generated where
//!
//! The [`Exporter`] walks folders and their tracks in store order and decides,
//! per track and per folder, whether an output file has to be written:
//!
//! - **Individual**: `{output_dir}/[{folder}/]{id:08}_{name}.gpx` per track,
//!   skipped when the file already exists unless `force` is set
//! - **Folder aggregate** (individual mode option): `{output_dir}/{folder}.gpx`
//!   with every track of a real folder, rewritten when `force` is set or the
//!   folder gained a track without an individual file
//! - **Combined**: one file with every track, titled `"{folder} - {name}"`

use crate::assemble::{TrackFragment, assemble, document};
use crate::sanitize::sanitize_filename;
use crate::store::{Folder, TrackRecord, TrackSource};
use crate::writer::{GpxWriter, WriteOutcome, restore_timestamp};
use crate::{ExportError, Result};

use gpx::Gpx;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Output document scope of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExportMode {
    /// One file per track, optionally one per folder too
    #[default]
    Individual,
    /// A single file holding every track
    Combined,
}

/// Configuration of an export run
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExportConfig {
    /// Base directory for individual and folder files
    pub output_dir: PathBuf,
    /// Target of combined mode
    pub combined_file: PathBuf,
    pub mode: ExportMode,
    /// Also write one file per folder (individual mode only)
    pub folder_aggregate: bool,
    /// Regenerate files that already exist (individual mode only)
    pub force: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("tracks"),
            combined_file: PathBuf::from("tracks.gpx"),
            mode: ExportMode::Individual,
            folder_aggregate: false,
            force: false,
        }
    }
}

impl ExportConfig {
    /// One file per track below `output_dir`
    pub fn individual<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    /// All tracks into `file`
    pub fn combined<P: Into<PathBuf>>(file: P) -> Self {
        Self {
            combined_file: file.into(),
            mode: ExportMode::Combined,
            ..Default::default()
        }
    }

    pub fn with_folder_aggregate(mut self, folder_aggregate: bool) -> Self {
        self.folder_aggregate = folder_aggregate;
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// What happened to the files of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExportReport {
    pub tracks_written: usize,
    /// Written under the id-only fallback name
    pub tracks_degraded: usize,
    pub tracks_skipped: usize,
    pub tracks_failed: usize,
    pub folders_written: usize,
    pub folders_skipped: usize,
    pub folders_failed: usize,
    pub combined_written: bool,
}

impl ExportReport {
    /// Number of files created or overwritten
    pub fn files_touched(&self) -> usize {
        self.tracks_written
            + self.tracks_degraded
            + self.folders_written
            + usize::from(self.combined_written)
    }

    fn record_track(&mut self, state: TrackState) {
        match state {
            TrackState::Skipped => self.tracks_skipped += 1,
            TrackState::Written => self.tracks_written += 1,
            TrackState::Degraded => self.tracks_degraded += 1,
            TrackState::Failed => self.tracks_failed += 1,
        }
    }
}

/// Final state of a track's individual file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrackState {
    Skipped,
    Written,
    Degraded,
    Failed,
}

impl From<&WriteOutcome> for TrackState {
    fn from(outcome: &WriteOutcome) -> Self {
        match outcome {
            WriteOutcome::Written(_) => TrackState::Written,
            WriteOutcome::Degraded(_) => TrackState::Degraded,
            WriteOutcome::Failed => TrackState::Failed,
        }
    }
}

/// Primary and fallback location of a track's individual file
struct TrackFile {
    primary: PathBuf,
    fallback: PathBuf,
}

impl TrackFile {
    fn new(dir: &Path, record: &TrackRecord) -> Self {
        Self {
            primary: dir.join(format!(
                "{:08}_{}.gpx",
                record.id,
                sanitize_filename(&record.name)
            )),
            fallback: dir.join(format!("{:08}.gpx", record.id)),
        }
    }

    /// An earlier run left a file under either name
    fn exists(&self) -> bool {
        self.primary.exists() || self.fallback.exists()
    }
}

/// A track planned for individual export
struct PlannedTrack {
    record: TrackRecord,
    file: TrackFile,
    write: bool,
}

/// Runs one export over a [`TrackSource`]
pub struct Exporter<'a> {
    source: &'a dyn TrackSource,
    config: &'a ExportConfig,
}

impl<'a> Exporter<'a> {
    pub fn new(source: &'a dyn TrackSource, config: &'a ExportConfig) -> Self {
        Self { source, config }
    }

    /// Export according to the configured mode
    ///
    /// Only a missing output directory or a store failure abort the run, every
    /// other problem is logged and counted in the report.
    pub fn run(&self) -> Result<ExportReport> {
        #[cfg(feature = "profiling")]
        profiling::scope!("planner::run");

        let report = match self.config.mode {
            ExportMode::Individual => self.export_individual()?,
            ExportMode::Combined => self.export_combined()?,
        };
        tracing::debug!("Export finished: {report:?}");
        Ok(report)
    }

    fn export_individual(&self) -> Result<ExportReport> {
        create_output_dir(&self.config.output_dir)?;

        let mut report = ExportReport::default();
        for folder in self.source.list_folders()? {
            self.export_folder(&folder, &mut report)?;
        }
        Ok(report)
    }

    fn export_folder(&self, folder: &Folder, report: &mut ExportReport) -> Result<()> {
        #[cfg(feature = "profiling")]
        profiling::scope!("planner::export_folder");

        let tracks = self.source.list_tracks(folder)?;
        if tracks.is_empty() {
            return Ok(());
        }
        let dir = self.folder_dir(folder);

        // Existence is checked for the whole folder before anything is written
        let planned: Vec<PlannedTrack> = tracks
            .into_iter()
            .map(|record| {
                let file = TrackFile::new(&dir, &record);
                let write = self.config.force || !file.exists();
                PlannedTrack {
                    record,
                    file,
                    write,
                }
            })
            .collect();

        let aggregate = match folder.name() {
            Some(name) if self.config.folder_aggregate => Some(name),
            _ => None,
        };
        let regenerate_aggregate =
            aggregate.is_some() && (self.config.force || planned.iter().any(|t| t.write));

        let mut fragments = Vec::new();
        for track in planned {
            if !track.write && !regenerate_aggregate {
                tracing::info!(
                    "Skipping track {} - {}: {} exists",
                    track.record.id,
                    track.record.name,
                    track.file.primary.display()
                );
                report.record_track(TrackState::Skipped);
                continue;
            }

            let data = self.source.read_track(track.record)?;
            let fragment = assemble(&data, &data.record.name);

            if track.write {
                tracing::info!("Exporting track {} - {}", data.record.id, data.record.name);
                let state = write_track(&fragment, &track.file, data.record.start_time_ms);
                report.record_track(state);
            } else {
                report.record_track(TrackState::Skipped);
            }

            if regenerate_aggregate {
                fragments.push(fragment);
            }
        }

        if let Some(name) = aggregate {
            let path = self.config.output_dir.join(format!("{}.gpx", sanitize_filename(name)));
            if regenerate_aggregate {
                tracing::info!("Exporting folder {name} to {}", path.display());
                match write_document(&document(fragments), &path, None) {
                    WriteOutcome::Failed => report.folders_failed += 1,
                    _ => report.folders_written += 1,
                }
            } else {
                tracing::info!("Skipping folder {name}: no new tracks");
                report.folders_skipped += 1;
            }
        }
        Ok(())
    }

    fn export_combined(&self) -> Result<ExportReport> {
        let path = &self.config.combined_file;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_output_dir(parent)?;
        }

        let mut fragments = Vec::new();
        for folder in self.source.list_folders()? {
            for record in self.source.list_tracks(&folder)? {
                tracing::info!("Exporting track {} - {}", record.id, record.name);
                let title = record.folder_qualified_name();
                let data = self.source.read_track(record)?;
                fragments.push(assemble(&data, &title));
            }
        }

        tracing::info!("Writing {} tracks to {}", fragments.len(), path.display());
        let outcome = write_document(&document(fragments), path, None);
        Ok(ExportReport {
            combined_written: outcome != WriteOutcome::Failed,
            ..Default::default()
        })
    }

    /// Directory for the individual files of `folder`
    ///
    /// Real folders get a sub-directory. When it cannot be created the files
    /// go to the base output directory.
    fn folder_dir(&self, folder: &Folder) -> PathBuf {
        let base = &self.config.output_dir;
        let Some(name) = folder.name() else {
            return base.clone();
        };

        let dir_name = sanitize_filename(name);
        if matches!(dir_name.as_str(), "." | "..") {
            tracing::warn!(
                "Folder name {dir_name:?} is not a usable directory - using {} instead",
                base.display()
            );
            return base.clone();
        }

        let dir = base.join(dir_name);
        match fs::create_dir(&dir) {
            Ok(()) => dir,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => dir,
            Err(err) => {
                tracing::warn!(
                    "Cannot create folder directory {}: {err} - using {} instead",
                    dir.display(),
                    base.display()
                );
                base.clone()
            }
        }
    }
}

fn create_output_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| ExportError::OutputDir {
        path: path.to_path_buf(),
        source,
    })
}

fn write_document(gpx: &Gpx, primary: &Path, fallback: Option<&Path>) -> WriteOutcome {
    match GpxWriter::serialize(gpx) {
        Ok(writer) => writer.write(primary, fallback),
        Err(err) => {
            tracing::error!("{err} - skipping {}", primary.display());
            WriteOutcome::Failed
        }
    }
}

/// Write one track file and stamp it with the track start time
fn write_track(
    fragment: &TrackFragment,
    file: &TrackFile,
    start_time_ms: Option<i64>,
) -> TrackState {
    let gpx = document([fragment.clone()]);
    let outcome = write_document(&gpx, &file.primary, Some(&file.fallback));

    if let (Some(path), Some(start)) = (outcome.path(), start_time_ms.filter(|ms| *ms != 0)) {
        if let Err(err) = restore_timestamp(path, start) {
            tracing::warn!("Cannot set file time of {}: {err}", path.display());
        }
    }
    TrackState::from(&outcome)
}
