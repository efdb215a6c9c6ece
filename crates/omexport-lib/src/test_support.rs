//! In-memory Oruxmaps databases for unit tests

use crate::OruxStore;
use rusqlite::{Connection, params};

const SCHEMA: &str = r"
CREATE TABLE tracks (
    _id INTEGER PRIMARY KEY,
    trackname TEXT,
    trackdescr TEXT,
    trackfolder TEXT,
    trackfechaini INTEGER
);
CREATE TABLE segments (
    _id INTEGER PRIMARY KEY,
    segtrack INTEGER
);
CREATE TABLE trackpoints (
    _id INTEGER PRIMARY KEY,
    trkptseg INTEGER,
    trkptlat REAL,
    trkptlon REAL,
    trkptalt REAL,
    trkpttime INTEGER
);
CREATE TABLE pois (
    _id INTEGER PRIMARY KEY,
    poitrack INTEGER,
    poilat REAL,
    poilon REAL,
    poiname TEXT
);
";

pub struct StoreBuilder {
    conn: Connection,
}

impl StoreBuilder {
    pub fn new() -> Self {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        Self { conn }
    }

    pub fn track(self, id: i64, folder: Option<&str>, name: &str) -> Self {
        self.track_started(id, folder, name, None)
    }

    pub fn track_started(
        self,
        id: i64,
        folder: Option<&str>,
        name: &str,
        start_time_ms: Option<i64>,
    ) -> Self {
        self.conn
            .execute(
                "INSERT INTO tracks (_id, trackname, trackdescr, trackfolder, trackfechaini)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, name, format!("{name} description"), folder, start_time_ms],
            )
            .unwrap();
        self
    }

    pub fn segment(self, id: i64, track_id: i64) -> Self {
        self.conn
            .execute(
                "INSERT INTO segments (_id, segtrack) VALUES (?1, ?2)",
                params![id, track_id],
            )
            .unwrap();
        self
    }

    pub fn point(
        self,
        id: i64,
        segment_id: i64,
        lat: f64,
        lon: f64,
        elevation: Option<f64>,
        time_ms: Option<i64>,
    ) -> Self {
        self.conn
            .execute(
                "INSERT INTO trackpoints (_id, trkptseg, trkptlat, trkptlon, trkptalt, trkpttime)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![id, segment_id, lat, lon, elevation, time_ms],
            )
            .unwrap();
        self
    }

    pub fn poi(self, track_id: i64, lat: f64, lon: f64, name: Option<&str>) -> Self {
        self.conn
            .execute(
                "INSERT INTO pois (poitrack, poilat, poilon, poiname) VALUES (?1, ?2, ?3, ?4)",
                params![track_id, lat, lon, name],
            )
            .unwrap();
        self
    }

    pub fn build(self) -> OruxStore {
        OruxStore::from_connection(self.conn)
    }
}

/// Two tracks: `1 "Morning Walk"` without folder and `2 "Ridge"` in "Hiking"
pub fn morning_walk_and_ridge() -> OruxStore {
    StoreBuilder::new()
        .track_started(1, None, "Morning Walk", Some(1_500_000_000_000))
        .segment(1, 1)
        .point(1, 1, 47.3769, 8.5417, Some(408.0), Some(1_500_000_000_000))
        .point(2, 1, 47.3770, 8.5419, Some(409.5), Some(1_500_000_005_000))
        .track(2, Some("Hiking"), "Ridge")
        .segment(2, 2)
        .point(3, 2, 46.5586, 7.8350, None, None)
        .poi(2, 46.5580, 7.8355, Some("Hut"))
        .build()
}
