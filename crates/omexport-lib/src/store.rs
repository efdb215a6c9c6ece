//! Read access to the Oruxmaps track database
//!
//! Oruxmaps keeps its recordings in `oruxmapstracks.db`:
//!
//! - `tracks(_id, trackname, trackdescr, trackfolder, trackfechaini)`
//! - `segments(_id, segtrack)`
//! - `trackpoints(_id, trkptseg, trkptlat, trkptlon, trkptalt, trkpttime)`
//! - `pois(_id, poitrack, poilat, poilon, poiname)`
//!
//! All times are milliseconds since the Unix epoch. The exporter only ever
//! reads through the [`TrackSource`] trait, [`OruxStore`] is the SQLite
//! implementation.

use crate::Result;
use rusqlite::{Connection, OpenFlags, Row, params};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Folder values Oruxmaps uses for "no folder"
const SENTINEL_FOLDERS: [&str; 2] = ["", "---"];

/// Grouping key of a track, as stored in `tracks.trackfolder`
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Folder(Option<String>);

impl Folder {
    /// The NULL folder
    pub fn none() -> Self {
        Self(None)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self(Some(name.into()))
    }

    /// Raw stored value, `None` for NULL
    pub fn value(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// True for NULL, `""` and `"---"`, which all mean "no folder"
    pub fn is_sentinel(&self) -> bool {
        match self.value() {
            None => true,
            Some(name) => SENTINEL_FOLDERS.contains(&name),
        }
    }

    /// Folder name for real folders, `None` for the sentinel folders
    pub fn name(&self) -> Option<&str> {
        if self.is_sentinel() {
            None
        } else {
            self.value()
        }
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("(no folder)"))
    }
}

/// Track metadata from the `tracks` table
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackRecord {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub folder: Folder,
    /// Recording start in epoch milliseconds
    pub start_time_ms: Option<i64>,
}

impl TrackRecord {
    /// Track title used in combined exports: `"{folder} - {name}"` for tracks in a real folder
    pub fn folder_qualified_name(&self) -> String {
        match self.folder.name() {
            Some(folder) => format!("{folder} - {}", self.name),
            None => self.name.clone(),
        }
    }
}

/// A single track point
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
    pub elevation: Option<f64>,
    /// Epoch milliseconds, `None` or `Some(0)` when the app did not record a time
    pub time_ms: Option<i64>,
}

/// A point of interest attached to a track
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Poi {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
}

/// A track with all of its segments, points and points of interest loaded
#[derive(Debug, Clone, PartialEq)]
pub struct TrackData {
    pub record: TrackRecord,
    /// Points per segment, both in ascending id order
    pub segments: Vec<Vec<Point>>,
    pub pois: Vec<Poi>,
}

impl TrackData {
    pub fn total_points(&self) -> usize {
        self.segments.iter().map(Vec::len).sum()
    }
}

/// Read-only access to tracks and everything hanging off them
///
/// Ordering is part of the contract: folders ascend (NULL first), tracks,
/// segments and points ascend by id.
pub trait TrackSource {
    /// Distinct folder keys in ascending order
    fn list_folders(&self) -> Result<Vec<Folder>>;

    /// Tracks stored with exactly this folder value, by ascending id
    fn list_tracks(&self, folder: &Folder) -> Result<Vec<TrackRecord>>;

    /// Segment ids of a track, ascending
    fn read_segments(&self, track_id: i64) -> Result<Vec<i64>>;

    /// Points of a segment, by ascending point id
    fn read_points(&self, segment_id: i64) -> Result<Vec<Point>>;

    /// Points of interest of a track, order not significant
    fn read_waypoints(&self, track_id: i64) -> Result<Vec<Poi>>;

    /// Load segments, points and waypoints of a track
    fn read_track(&self, record: TrackRecord) -> Result<TrackData> {
        let segments = self
            .read_segments(record.id)?
            .into_iter()
            .map(|segment_id| self.read_points(segment_id))
            .collect::<Result<Vec<_>>>()?;
        let pois = self.read_waypoints(record.id)?;
        Ok(TrackData {
            record,
            segments,
            pois,
        })
    }
}

const LIST_FOLDERS: &str = "SELECT DISTINCT trackfolder FROM tracks ORDER BY trackfolder";

const LIST_TRACKS_NULL_FOLDER: &str = "SELECT _id, trackname, trackdescr, trackfolder, trackfechaini
     FROM tracks WHERE trackfolder IS NULL ORDER BY _id";

const LIST_TRACKS_IN_FOLDER: &str = "SELECT _id, trackname, trackdescr, trackfolder, trackfechaini
     FROM tracks WHERE trackfolder = ?1 ORDER BY _id";

const READ_SEGMENTS: &str = "SELECT _id FROM segments WHERE segtrack = ?1 ORDER BY _id";

const READ_POINTS: &str = "SELECT trkptlat, trkptlon, trkptalt, trkpttime
     FROM trackpoints WHERE trkptseg = ?1 ORDER BY _id";

const READ_POIS: &str = "SELECT poilat, poilon, poiname FROM pois WHERE poitrack = ?1";

/// SQLite backed [`TrackSource`] over an `oruxmapstracks.db` file
pub struct OruxStore {
    conn: Connection,
}

impl OruxStore {
    /// Open an existing database read-only
    ///
    /// A missing file is an error rather than a freshly created empty database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        tracing::debug!("Opened track database {}", path.display());
        Ok(Self { conn })
    }

    /// Wrap an already open connection
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Close the connection, reporting errors that dropping would swallow
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| err.into())
    }

    fn track_from_row(row: &Row<'_>) -> rusqlite::Result<TrackRecord> {
        Ok(TrackRecord {
            id: row.get(0)?,
            name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            folder: Folder(row.get(3)?),
            start_time_ms: row.get(4)?,
        })
    }
}

impl TrackSource for OruxStore {
    fn list_folders(&self) -> Result<Vec<Folder>> {
        let mut stmt = self.conn.prepare_cached(LIST_FOLDERS)?;
        let folders = stmt
            .query_map([], |row| Ok(Folder(row.get(0)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(folders)
    }

    fn list_tracks(&self, folder: &Folder) -> Result<Vec<TrackRecord>> {
        let tracks = match folder.value() {
            None => {
                let mut stmt = self.conn.prepare_cached(LIST_TRACKS_NULL_FOLDER)?;
                stmt.query_map([], Self::track_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?
            }
            Some(name) => {
                let mut stmt = self.conn.prepare_cached(LIST_TRACKS_IN_FOLDER)?;
                stmt.query_map(params![name], Self::track_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        Ok(tracks)
    }

    fn read_segments(&self, track_id: i64) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare_cached(READ_SEGMENTS)?;
        let segments = stmt
            .query_map(params![track_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(segments)
    }

    fn read_points(&self, segment_id: i64) -> Result<Vec<Point>> {
        let mut stmt = self.conn.prepare_cached(READ_POINTS)?;
        let points = stmt
            .query_map(params![segment_id], |row| {
                Ok(Point {
                    lat: row.get(0)?,
                    lon: row.get(1)?,
                    elevation: row.get(2)?,
                    time_ms: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(points)
    }

    fn read_waypoints(&self, track_id: i64) -> Result<Vec<Poi>> {
        let mut stmt = self.conn.prepare_cached(READ_POIS)?;
        let pois = stmt
            .query_map(params![track_id], |row| {
                Ok(Poi {
                    lat: row.get(0)?,
                    lon: row.get(1)?,
                    name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(pois)
    }
}
