//! Getting Started Example
//!
//! Stores a handful of discovered panoramas, groups them by location, and
//! prints per-location temporal coverage statistics.

use panostat::export::export_stat_rows;
use panostat::grouping::{group_by_location, sort_by_location};
use panostat::stats::assemble_stats;
use panostat::{CaptureDate, CoordinateSource, MemoryStore, PanoramaRecord, RecordStore};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    println!("=== panostat - Getting Started ===\n");

    // An in-memory store, as the discovery workflow would fill it.
    let mut store = MemoryStore::new();

    let discovered = vec![
        // One street corner revisited three times over a decade.
        ("corner-2009", 2009, 5, 4.8901, 52.3701),
        ("corner-2014", 2014, 8, 4.8901, 52.3701),
        ("corner-2019", 2019, 3, 4.8901, 52.3701),
        // A side street captured once.
        ("side-street", 2016, 10, 4.8955, 52.3733),
    ];

    for (pano_id, year, month, x, y) in discovered {
        store.insert(
            "postcodes",
            PanoramaRecord::new("1011", pano_id, CaptureDate::new(year, month)?, (x, y), (x, y)),
        )?;
    }
    println!("✓ Stored {} panorama records\n", store.len("postcodes"));

    // Group panoramas taken at the same location.
    let mut records = store.records("postcodes")?;
    sort_by_location(&mut records, CoordinateSource::Pano);
    let groups = group_by_location(&records, CoordinateSource::Pano, Some(6));
    println!("✓ {} distinct locations\n", groups.len());

    // Reduce each location to its temporal coverage.
    let rows = assemble_stats(&groups, CoordinateSource::Pano)?;
    for row in &rows {
        println!(
            "   ({:.4}, {:.4})  {} .. {}  span {:.1} years over {} capture dates",
            row.x, row.y, row.earliest, row.latest, row.year_delta, row.distinct_count
        );
    }

    // Export the rows for downstream analysis.
    std::fs::create_dir_all("output")?;
    export_stat_rows("output/pano_timestats.csv", &rows)?;
    println!("\n✓ Exported statistics to output/pano_timestats.csv");

    Ok(())
}
