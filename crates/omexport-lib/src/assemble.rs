//! GPX document assembly
//!
//! Turns loaded [`TrackData`] into `gpx` values. Nothing here touches the
//! database or the filesystem.

use crate::store::{Point, Poi, TrackData};
use gpx::{Gpx, GpxVersion, Time, Track, TrackSegment, Waypoint};
use time::OffsetDateTime;
use time::macros::datetime;

/// Creator attribute of every exported document
pub const CREATOR: &str = "omexport";

/// Time given to points recorded without one
///
/// The earliest instant an RFC 3339 GPX timestamp can carry.
pub const MIN_TIME: OffsetDateTime = datetime!(0001-01-01 00:00 UTC);

/// Latest year an RFC 3339 timestamp can carry
const MAX_YEAR: i32 = 9999;

/// One track rendering plus the waypoints it contributes to its document
#[derive(Debug, Clone, Default)]
pub struct TrackFragment {
    pub track: Track,
    pub waypoints: Vec<Waypoint>,
}

/// Convert epoch milliseconds to a GPX time
///
/// Missing or zero times, and times a GPX file cannot represent, map to [`MIN_TIME`].
pub fn point_time(time_ms: Option<i64>) -> Time {
    let datetime = match time_ms {
        None | Some(0) => MIN_TIME,
        Some(ms) => OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
            .ok()
            .filter(|dt| *dt >= MIN_TIME && dt.year() <= MAX_YEAR)
            .unwrap_or(MIN_TIME),
    };
    Time::from(datetime)
}

fn track_point(point: &Point) -> Waypoint {
    let mut waypoint = Waypoint::new(geo::Point::new(point.lon, point.lat));
    waypoint.elevation = point.elevation;
    waypoint.time = Some(point_time(point.time_ms));
    waypoint
}

fn poi_waypoint(poi: &Poi) -> Waypoint {
    let mut waypoint = Waypoint::new(geo::Point::new(poi.lon, poi.lat));
    if !poi.name.is_empty() {
        waypoint.name = Some(poi.name.clone());
    }
    waypoint
}

/// Build the track node for `data`, titled `title`
///
/// Segment and point order are taken as loaded, the store already returns
/// them by ascending id.
pub fn assemble(data: &TrackData, title: &str) -> TrackFragment {
    #[cfg(feature = "profiling")]
    profiling::scope!("assemble::assemble");

    let track = Track {
        name: Some(title.to_string()),
        description: Some(data.record.description.clone()).filter(|d| !d.is_empty()),
        segments: data
            .segments
            .iter()
            .map(|points| TrackSegment {
                points: points.iter().map(track_point).collect(),
            })
            .collect(),
        ..Default::default()
    };

    TrackFragment {
        track,
        waypoints: data.pois.iter().map(poi_waypoint).collect(),
    }
}

/// Collect fragments into one GPX 1.1 document
///
/// Tracks keep the order of `fragments`, waypoints are appended at document level.
pub fn document(fragments: impl IntoIterator<Item = TrackFragment>) -> Gpx {
    let mut gpx = Gpx {
        version: GpxVersion::Gpx11,
        creator: Some(CREATOR.to_string()),
        ..Default::default()
    };
    for fragment in fragments {
        gpx.tracks.push(fragment.track);
        gpx.waypoints.extend(fragment.waypoints);
    }
    gpx
}
