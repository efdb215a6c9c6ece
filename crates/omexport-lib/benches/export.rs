//! Export benchmarks for omexport-lib
//!
//! Run with: cargo bench --package omexport-lib

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use omexport_lib::assemble::{assemble, document};
use omexport_lib::{ExportConfig, Exporter, GpxWriter, OruxStore, TrackSource};
use rusqlite::{Connection, params};

const SCHEMA: &str = r"
CREATE TABLE tracks (_id INTEGER PRIMARY KEY, trackname TEXT, trackdescr TEXT, trackfolder TEXT, trackfechaini INTEGER);
CREATE TABLE segments (_id INTEGER PRIMARY KEY, segtrack INTEGER);
CREATE TABLE trackpoints (_id INTEGER PRIMARY KEY, trkptseg INTEGER, trkptlat REAL, trkptlon REAL, trkptalt REAL, trkpttime INTEGER);
CREATE TABLE pois (_id INTEGER PRIMARY KEY, poitrack INTEGER, poilat REAL, poilon REAL, poiname TEXT);
";

/// Generate a store with `num_tracks` single-segment tracks spread over a few folders
fn generate_store(num_tracks: i64, points_per_track: i64) -> OruxStore {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(SCHEMA).unwrap();

    let tx = conn.transaction().unwrap();
    for track in 0..num_tracks {
        let folder = format!("Folder {}", track % 4);
        tx.execute(
            "INSERT INTO tracks VALUES (?1, ?2, '', ?3, ?4)",
            params![track, format!("Track {track}"), folder, 1_500_000_000_000i64],
        )
        .unwrap();
        tx.execute("INSERT INTO segments VALUES (?1, ?1)", params![track])
            .unwrap();
        for i in 0..points_per_track {
            let t = i as f64 / points_per_track as f64;
            tx.execute(
                "INSERT INTO trackpoints (trkptseg, trkptlat, trkptlon, trkptalt, trkpttime)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    track,
                    47.0 + t * 0.1 + (t * 50.0).sin() * 0.001,
                    8.0 + t * 0.1,
                    400.0 + t * 100.0,
                    1_500_000_000_000i64 + i * 1_000
                ],
            )
            .unwrap();
        }
    }
    tx.commit().unwrap();
    OruxStore::from_connection(conn)
}

fn bench_assemble_and_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("document");

    for points in [1_000i64, 50_000] {
        let store = generate_store(1, points);
        let folder = store.list_folders().unwrap().remove(0);
        let record = store.list_tracks(&folder).unwrap().remove(0);
        let data = store.read_track(record).unwrap();

        group.throughput(Throughput::Elements(points as u64));
        group.bench_with_input(BenchmarkId::new("serialize", points), &data, |b, data| {
            b.iter(|| {
                let gpx = document([assemble(data, &data.record.name)]);
                GpxWriter::serialize(&gpx).unwrap().len()
            })
        });
    }

    group.finish();
}

fn bench_individual_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export");
    group.sample_size(10);

    let store = generate_store(40, 2_000);
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig::individual(dir.path())
        .with_folder_aggregate(true)
        .with_force(true);

    group.bench_function("individual_forced_40x2000", |b| {
        b.iter(|| Exporter::new(&store, &config).run().unwrap())
    });

    // Everything exists already: planning only
    let skip_config = ExportConfig::individual(dir.path());
    group.bench_function("individual_skip_40", |b| {
        b.iter(|| Exporter::new(&store, &skip_config).run().unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_assemble_and_serialize, bench_individual_export);
criterion_main!(benches);
