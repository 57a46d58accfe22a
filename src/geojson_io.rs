//! GeoJSON polygon input and annotated-polygon output.
//!
//! Region polygons come in as a GeoJSON feature collection; annotated
//! polygons go back out with capture statistics stamped into the feature
//! properties. Every stat property is initialized to the no-data sentinel
//! first and only overwritten when the polygon actually has panoramas, so a
//! polygon with zero captures reads as sentinel values, never as missing
//! keys.

use std::fs;
use std::path::Path;

use geo::MultiPolygon;
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject};
use serde_json::{Value, json};

use crate::aggregate::{PolygonStats, polygon_time_stats};
use crate::error::{PanostatError, Result};
use crate::store::RecordStore;

/// Date-valued stat properties; these get a string placeholder instead of
/// the numeric sentinel.
const DATE_KEYS: [&str; 3] = ["earliest", "latest", "mean_date"];

/// One region polygon read from a feature collection.
#[derive(Debug, Clone)]
pub struct RegionPolygon {
    /// Value of the id property (e.g. a postal code).
    pub id: String,
    pub geometry: MultiPolygon<f64>,
    /// Original feature properties, preserved on output.
    pub properties: JsonObject,
}

/// Read region polygons from a GeoJSON file.
///
/// Accepts `Polygon` and `MultiPolygon` features; other geometry types and
/// features missing the id property are skipped with a warning, matching the
/// tolerant reader behavior expected of file adapters.
pub fn read_region_polygons<P: AsRef<Path>>(
    path: P,
    id_property: &str,
) -> Result<Vec<RegionPolygon>> {
    let contents = fs::read_to_string(path)?;
    let geojson: GeoJson = contents
        .parse()
        .map_err(|e| PanostatError::GeoJson(format!("failed to parse GeoJSON: {}", e)))?;

    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(PanostatError::GeoJson(
            "expected a FeatureCollection of region polygons".into(),
        ));
    };

    let mut polygons = Vec::new();

    for feature in collection.features {
        let properties = feature.properties.clone().unwrap_or_default();

        let Some(id) = property_as_string(&properties, id_property) else {
            log::warn!("skipping feature without '{}' property", id_property);
            continue;
        };

        let Some(geometry) = feature.geometry else {
            log::warn!("skipping feature '{}' without geometry", id);
            continue;
        };

        let geo_geom: geo::Geometry<f64> = geometry
            .try_into()
            .map_err(|e| PanostatError::GeoJson(format!("feature '{}': {}", id, e)))?;

        let multi_polygon = match geo_geom {
            geo::Geometry::MultiPolygon(mp) => mp,
            geo::Geometry::Polygon(p) => MultiPolygon(vec![p]),
            _ => {
                log::warn!("skipping feature '{}' with non-polygon geometry", id);
                continue;
            }
        };

        polygons.push(RegionPolygon {
            id,
            geometry: multi_polygon,
            properties,
        });
    }

    Ok(polygons)
}

/// Write polygons with their (possibly absent) capture statistics.
///
/// Stat properties are sentinel-initialized before stamping: polygons whose
/// stats are `None` keep the numeric sentinel (and a `"-9999"`-style
/// placeholder for date fields).
pub fn write_annotated_polygons<P: AsRef<Path>>(
    path: P,
    entries: &[(RegionPolygon, Option<PolygonStats>)],
    sentinel: f64,
) -> Result<()> {
    let features = entries
        .iter()
        .map(|(polygon, stats)| {
            let mut properties = polygon.properties.clone();

            for key in PolygonStats::PROPERTY_KEYS {
                properties.insert(key.to_string(), sentinel_value(key, sentinel));
            }

            if let Some(stats) = stats {
                properties.insert("earliest".into(), json!(stats.earliest.to_string()));
                properties.insert("earliest_year".into(), json!(stats.earliest_year));
                properties.insert("latest".into(), json!(stats.latest.to_string()));
                properties.insert("latest_year".into(), json!(stats.latest_year));
                properties.insert("mean_date".into(), json!(stats.mean_date.to_string()));
                properties.insert("range_days".into(), json!(stats.range_days));
                properties.insert(
                    "rel_earliest_days".into(),
                    json!(stats.rel_earliest_days),
                );
            }

            Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(
                    &polygon.geometry,
                ))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };

    fs::write(path, GeoJson::from(collection).to_string())?;
    Ok(())
}

/// Annotate every polygon of a GeoJSON file with capture statistics.
///
/// Reads region polygons from `input`, aggregates panoramas from `region` in
/// the store over each polygon, and writes the annotated collection to
/// `output`. The spatial-statistics workflow end to end, minus discovery.
pub fn annotate_file<S, P, Q>(
    store: &S,
    region: &str,
    input: P,
    output: Q,
    id_property: &str,
    sentinel: f64,
) -> Result<Vec<(RegionPolygon, Option<PolygonStats>)>>
where
    S: RecordStore + ?Sized,
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let polygons = read_region_polygons(input, id_property)?;

    let mut entries = Vec::with_capacity(polygons.len());
    for polygon in polygons {
        let stats = polygon_time_stats(store, region, &polygon.geometry)?;
        if stats.is_none() {
            log::info!("no panoramas found in polygon '{}'", polygon.id);
        }
        entries.push((polygon, stats));
    }

    write_annotated_polygons(output, &entries, sentinel)?;
    Ok(entries)
}

fn sentinel_value(key: &str, sentinel: f64) -> Value {
    if DATE_KEYS.contains(&key) {
        return json!(format_sentinel(sentinel));
    }
    if sentinel.fract() == 0.0 {
        json!(sentinel as i64)
    } else {
        json!(sentinel)
    }
}

fn format_sentinel(sentinel: f64) -> String {
    if sentinel.fract() == 0.0 {
        format!("{}", sentinel as i64)
    } else {
        sentinel.to_string()
    }
}

fn property_as_string(properties: &JsonObject, key: &str) -> Option<String> {
    match properties.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
