//! Persisting GPX documents
//!
//! A document is serialized once and then written to its primary path. When
//! that fails the caller may offer a simpler fallback name, tried exactly once.

use gpx::Gpx;
use std::fs::{self, FileTimes};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Per-file write errors, never fatal to a run
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("GPX serialization error: {0}")]
    Serialize(#[from] gpx::errors::GpxError),

    #[error("Cannot write file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where a document ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Written under the primary path
    Written(PathBuf),
    /// Primary path failed, written under the fallback path
    Degraded(PathBuf),
    /// Nothing was written
    Failed,
}

impl WriteOutcome {
    pub fn path(&self) -> Option<&Path> {
        match self {
            WriteOutcome::Written(path) | WriteOutcome::Degraded(path) => Some(path.as_path()),
            WriteOutcome::Failed => None,
        }
    }
}

/// A serialized document ready to be written
pub struct GpxWriter {
    bytes: Vec<u8>,
}

impl GpxWriter {
    pub fn serialize(gpx: &Gpx) -> Result<Self, WriteError> {
        #[cfg(feature = "profiling")]
        profiling::scope!("writer::serialize");

        let mut bytes = Vec::new();
        gpx::write(gpx, &mut bytes)?;
        Ok(Self { bytes })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write to `primary`, retrying once at `fallback` if given
    ///
    /// Failures are logged here, the outcome tells the caller what happened.
    pub fn write(&self, primary: &Path, fallback: Option<&Path>) -> WriteOutcome {
        let err = match self.write_file(primary) {
            Ok(()) => return WriteOutcome::Written(primary.to_path_buf()),
            Err(err) => err,
        };

        let Some(fallback) = fallback else {
            tracing::error!("{err} - skipping.");
            return WriteOutcome::Failed;
        };
        tracing::warn!("{err} - using {} instead", fallback.display());

        match self.write_file(fallback) {
            Ok(()) => WriteOutcome::Degraded(fallback.to_path_buf()),
            Err(err) => {
                tracing::error!("{err} - skipping.");
                WriteOutcome::Failed
            }
        }
    }

    fn write_file(&self, path: &Path) -> Result<(), WriteError> {
        #[cfg(feature = "profiling")]
        profiling::scope!("writer::write_file");

        fs::write(path, &self.bytes).map_err(|source| WriteError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Convert epoch milliseconds to a `SystemTime`
fn system_time(epoch_ms: i64) -> Option<SystemTime> {
    let offset = Duration::from_millis(epoch_ms.unsigned_abs());
    if epoch_ms >= 0 {
        UNIX_EPOCH.checked_add(offset)
    } else {
        UNIX_EPOCH.checked_sub(offset)
    }
}

/// Set access and modification time of `path` to the track start time
pub fn restore_timestamp(path: &Path, epoch_ms: i64) -> io::Result<()> {
    let time = system_time(epoch_ms).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("start time {epoch_ms} ms is out of range"),
        )
    })?;
    let file = fs::File::options().write(true).open(path)?;
    file.set_times(FileTimes::new().set_accessed(time).set_modified(time))
}
