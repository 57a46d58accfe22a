//! Polygon Time-Statistics Example
//!
//! Annotates neighborhood polygons with panorama capture statistics:
//! bounding-box pre-filter, exact point-in-polygon filter, and sentinel
//! values for polygons without any panoramas.

use panostat::aggregate::polygon_time_stats;
use panostat::geojson_io::{RegionPolygon, write_annotated_polygons};
use panostat::{CaptureDate, Config, MemoryStore, PanoramaRecord, RecordStore};
use geo::{MultiPolygon, polygon};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    println!("=== panostat - Polygon Time Statistics ===\n");

    let config = Config::default();

    // Panoramas discovered around two city-center blocks.
    let mut store = MemoryStore::new();
    let discovered = vec![
        ("a1", 2009, 5, 4.8901, 52.3701),
        ("a2", 2015, 2, 4.8912, 52.3705),
        ("a3", 2021, 9, 4.8898, 52.3699),
        ("b1", 2013, 11, 4.9011, 52.3787),
    ];
    for (pano_id, year, month, x, y) in discovered {
        store.insert(
            "ams",
            PanoramaRecord::new("1011", pano_id, CaptureDate::new(year, month)?, (x, y), (x, y)),
        )?;
    }

    // Two neighborhood polygons; the second has no coverage.
    let covered = RegionPolygon {
        id: "1011".into(),
        geometry: MultiPolygon(vec![polygon![
            (x: 4.885, y: 52.365),
            (x: 4.905, y: 52.365),
            (x: 4.905, y: 52.382),
            (x: 4.885, y: 52.382),
        ]]),
        properties: Default::default(),
    };
    let uncovered = RegionPolygon {
        id: "1099".into(),
        geometry: MultiPolygon(vec![polygon![
            (x: 5.000, y: 52.500),
            (x: 5.020, y: 52.500),
            (x: 5.020, y: 52.520),
            (x: 5.000, y: 52.520),
        ]]),
        properties: Default::default(),
    };

    let mut annotated = Vec::new();
    for region_poly in [covered, uncovered] {
        let stats = polygon_time_stats(&store, "ams", &region_poly.geometry)?;
        match &stats {
            Some(stats) => println!(
                "   polygon {}: {} .. {} ({} days, mean {})",
                region_poly.id, stats.earliest, stats.latest, stats.range_days, stats.mean_date
            ),
            None => println!("   polygon {}: no panoramas found", region_poly.id),
        }
        annotated.push((region_poly, stats));
    }

    std::fs::create_dir_all("output")?;
    write_annotated_polygons(
        "output/neighbourhoods_with_timestats.geojson",
        &annotated,
        config.sentinel,
    )?;
    println!("\n✓ Wrote output/neighbourhoods_with_timestats.geojson");

    Ok(())
}
