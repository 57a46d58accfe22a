//! Snapshot persistence across a full discovery-and-aggregate cycle.

use geo::polygon;
use panostat::aggregate::polygon_time_stats;
use panostat::persistence::{load_snapshot, save_snapshot};
use panostat::{CaptureDate, MemoryStore, PanoramaRecord, RecordStore};

fn record(subregion: &str, pano_id: &str, year: i32, month: u32, x: f64, y: f64) -> PanoramaRecord {
    PanoramaRecord::new(
        subregion,
        pano_id,
        CaptureDate::new(year, month).unwrap(),
        (x, y),
        (x, y),
    )
}

#[test]
fn test_snapshot_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("survey.snapshot");

    {
        let mut store = MemoryStore::new();
        store
            .insert("ams", record("1011", "a", 2010, 1, 4.891, 52.371))
            .unwrap();
        store
            .insert("ams", record("1011", "b", 2017, 9, 4.893, 52.372))
            .unwrap();
        store
            .insert("rdam", record("3011", "c", 2013, 2, 4.48, 51.92))
            .unwrap();
        save_snapshot(&store, &path).unwrap();
        // Store dropped here; only the snapshot survives.
    }

    let restored = load_snapshot(&path).unwrap();
    assert_eq!(restored.stats().record_count, 3);
    assert_eq!(restored.regions(), vec!["ams", "rdam"]);

    // Aggregation over the restored store uses the rebuilt spatial index.
    let poly = polygon![
        (x: 4.88, y: 52.36),
        (x: 4.90, y: 52.36),
        (x: 4.90, y: 52.38),
        (x: 4.88, y: 52.38),
    ];
    let stats = polygon_time_stats(&restored, "ams", &poly).unwrap().unwrap();
    assert_eq!(stats.earliest_year, 2010);
    assert_eq!(stats.latest_year, 2017);
}

#[test]
fn test_snapshot_preserves_download_annotations() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("survey.snapshot");

    let mut store = MemoryStore::new();
    store
        .insert("ams", record("1011", "a", 2010, 1, 4.891, 52.371))
        .unwrap();
    let downloaded = chrono::NaiveDate::from_ymd_opt(2021, 7, 2).unwrap();
    store
        .mark_downloaded("ams", "a", "1011", downloaded, "imgs/2010/a.jpg")
        .unwrap();
    save_snapshot(&store, &path).unwrap();

    let restored = load_snapshot(&path).unwrap();
    let rec = &restored.records("ams").unwrap()[0];
    assert_eq!(rec.download_date, Some(downloaded));
    assert_eq!(rec.saved_path.as_deref(), Some("imgs/2010/a.jpg"));
}

#[test]
fn test_snapshot_of_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.snapshot");

    save_snapshot(&MemoryStore::new(), &path).unwrap();
    let restored = load_snapshot(&path).unwrap();

    assert_eq!(restored.stats().record_count, 0);
    assert!(restored.regions().is_empty());
}
