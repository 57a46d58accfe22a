//! Polygon-level aggregation of panorama capture history.
//!
//! For a region polygon, candidate records are pre-filtered with a cheap
//! bounding-box range query against the store, then exact-filtered with a
//! boundary-inclusive point-in-polygon test, and the surviving capture dates
//! are reduced to a [`PolygonStats`]. A polygon with zero matching panoramas
//! is a normal outcome, not an error: the aggregator returns `None` and the
//! caller's sentinel values stay in place.

use chrono::{Datelike, NaiveDate};
use geo::{BoundingRect, Intersects, Point};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::RecordStore;
use crate::temporal::{days_since_service_epoch, interval_stats, mean_capture_date};
use crate::types::CaptureDate;

/// Capture-history statistics for one polygon.
///
/// Dates are day-resolved via the first-of-month rule. `rel_earliest_days`
/// is counted from the imagery service's public launch (2005-01-01);
/// `range_days` spans earliest to latest capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonStats {
    pub earliest: NaiveDate,
    pub earliest_year: i32,
    pub latest: NaiveDate,
    pub latest_year: i32,
    pub mean_date: NaiveDate,
    pub range_days: i64,
    pub rel_earliest_days: i64,
}

impl PolygonStats {
    /// Attribute keys used when stamping stats onto polygon features, in
    /// stable output order.
    pub const PROPERTY_KEYS: [&'static str; 7] = [
        "earliest",
        "earliest_year",
        "latest",
        "latest_year",
        "mean_date",
        "range_days",
        "rel_earliest_days",
    ];

    /// Reduce a non-empty set of capture dates to polygon statistics.
    pub fn from_capture_dates(dates: &[CaptureDate]) -> Result<Self> {
        let interval = interval_stats(dates)?;
        let mean_date = mean_capture_date(dates)?;

        let earliest = interval.earliest.first_day();
        let latest = interval.latest.first_day();

        Ok(Self {
            earliest,
            earliest_year: earliest.year(),
            latest,
            latest_year: latest.year(),
            mean_date,
            range_days: (latest - earliest).num_days(),
            rel_earliest_days: days_since_service_epoch(earliest),
        })
    }
}

/// Compute capture statistics for the panoramas inside a polygon.
///
/// Works for any geometry with a bounding rectangle and a point containment
/// test (`Polygon`, `MultiPolygon`, `Rect`, ...). Containment is
/// boundary-inclusive: a panorama sitting exactly on the polygon edge counts.
///
/// Returns `Ok(None)` when no panorama falls inside the geometry (or the
/// geometry is empty); the caller keeps whatever no-data values it
/// initialized.
///
/// # Examples
///
/// ```rust
/// use geo::polygon;
/// use panostat::{CaptureDate, MemoryStore, PanoramaRecord, RecordStore};
/// use panostat::aggregate::polygon_time_stats;
///
/// let mut store = MemoryStore::new();
/// store.insert("ams", PanoramaRecord::new(
///     "1011",
///     "p1",
///     CaptureDate::new(2010, 1)?,
///     (4.895, 52.375),
///     (4.895, 52.375),
/// ))?;
///
/// let poly = polygon![
///     (x: 4.89, y: 52.37),
///     (x: 4.90, y: 52.37),
///     (x: 4.90, y: 52.38),
///     (x: 4.89, y: 52.38),
/// ];
///
/// let stats = polygon_time_stats(&store, "ams", &poly)?.unwrap();
/// assert_eq!(stats.earliest_year, 2010);
/// # Ok::<(), panostat::PanostatError>(())
/// ```
pub fn polygon_time_stats<S, G>(
    store: &S,
    region: &str,
    geometry: &G,
) -> Result<Option<PolygonStats>>
where
    S: RecordStore + ?Sized,
    G: BoundingRect<f64> + Intersects<Point>,
{
    let Some(bbox) = geometry.bounding_rect().into() else {
        return Ok(None);
    };

    let candidates = store.records_in_bbox(region, &bbox)?;

    let dates: Vec<CaptureDate> = candidates
        .iter()
        .filter(|record| geometry.intersects(&record.pano()))
        .map(|record| record.capture_date)
        .collect();

    if dates.is_empty() {
        return Ok(None);
    }

    PolygonStats::from_capture_dates(&dates).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::PanoramaRecord;
    use geo::{Polygon, polygon};

    fn insert(store: &mut MemoryStore, pano_id: &str, year: i32, month: u32, x: f64, y: f64) {
        store
            .insert(
                "ams",
                PanoramaRecord::new(
                    "1011",
                    pano_id,
                    CaptureDate::new(year, month).unwrap(),
                    (x, y),
                    (x, y),
                ),
            )
            .unwrap();
    }

    fn unit_square() -> Polygon {
        polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
        ]
    }

    #[test]
    fn test_empty_polygon_returns_none() {
        let store = MemoryStore::new();
        let stats = polygon_time_stats(&store, "ams", &unit_square()).unwrap();
        assert!(stats.is_none());
    }

    #[test]
    fn test_records_outside_polygon_are_excluded() {
        let mut store = MemoryStore::new();
        insert(&mut store, "far", 2010, 1, 5.0, 5.0);

        let stats = polygon_time_stats(&store, "ams", &unit_square()).unwrap();
        assert!(stats.is_none());
    }

    #[test]
    fn test_bbox_candidate_outside_polygon_is_excluded() {
        // Inside the bounding box of the triangle but outside the triangle
        // itself; the exact filter must reject what the coarse filter kept.
        let triangle = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 0.0, y: 1.0),
        ];
        let mut store = MemoryStore::new();
        insert(&mut store, "corner", 2010, 1, 0.9, 0.9);

        let stats = polygon_time_stats(&store, "ams", &triangle).unwrap();
        assert!(stats.is_none());
    }

    #[test]
    fn test_boundary_touching_points_are_included() {
        let mut store = MemoryStore::new();
        insert(&mut store, "edge", 2011, 6, 1.0, 0.5);
        insert(&mut store, "vertex", 2013, 6, 0.0, 0.0);

        let stats = polygon_time_stats(&store, "ams", &unit_square())
            .unwrap()
            .unwrap();
        assert_eq!(stats.earliest_year, 2011);
        assert_eq!(stats.latest_year, 2013);
    }

    #[test]
    fn test_stats_values() {
        let mut store = MemoryStore::new();
        insert(&mut store, "a", 2010, 1, 0.25, 0.25);
        insert(&mut store, "b", 2012, 7, 0.75, 0.75);

        let stats = polygon_time_stats(&store, "ams", &unit_square())
            .unwrap()
            .unwrap();

        assert_eq!(stats.earliest, NaiveDate::from_ymd_opt(2010, 1, 1).unwrap());
        assert_eq!(stats.latest, NaiveDate::from_ymd_opt(2012, 7, 1).unwrap());
        assert_eq!(stats.earliest_year, 2010);
        assert_eq!(stats.latest_year, 2012);
        // 2010-01-01 .. 2012-07-01 spans 912 days (2010 and 2011 are common
        // years, 2012 is a leap year).
        assert_eq!(stats.range_days, 912);
        // 2005-01-01 .. 2010-01-01 spans 1826 days (one leap year, 2008).
        assert_eq!(stats.rel_earliest_days, 1826);
        // Mean of the two first-of-month dates is their midpoint.
        assert_eq!(
            stats.mean_date,
            NaiveDate::from_ymd_opt(2011, 4, 2).unwrap()
        );
    }

    #[test]
    fn test_multipolygon_geometry() {
        use geo::MultiPolygon;

        let mut store = MemoryStore::new();
        insert(&mut store, "a", 2015, 2, 0.5, 0.5);
        insert(&mut store, "b", 2018, 8, 10.5, 10.5);

        let parts = MultiPolygon::new(vec![
            unit_square(),
            polygon![
                (x: 10.0, y: 10.0),
                (x: 11.0, y: 10.0),
                (x: 11.0, y: 11.0),
                (x: 10.0, y: 11.0),
            ],
        ]);

        let stats = polygon_time_stats(&store, "ams", &parts).unwrap().unwrap();
        assert_eq!(stats.earliest_year, 2015);
        assert_eq!(stats.latest_year, 2018);
    }
}
