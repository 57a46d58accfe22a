//! Record storage for discovered panoramas.
//!
//! This module provides a trait-based abstraction over the panorama record
//! store, allowing different backing implementations while keeping a
//! consistent, fully typed API: every operation names its target region
//! explicitly and works on [`PanoramaRecord`] values, never on raw rows.

use std::collections::BTreeMap;

use geo::Rect;
use rstar::{AABB, RTree, RTreeObject};

use crate::error::{PanostatError, Result};
use crate::types::PanoramaRecord;

/// Separator reserved in region names (used by snapshot file layout).
pub const REGION_SEPARATOR: &str = "::";

/// Outcome of a record insert.
///
/// Duplicate inserts are an expected, recoverable condition: discovery runs
/// are resumable, so re-querying a coordinate routinely re-yields panoramas
/// that are already stored. A batch must keep going when that happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The record was new and is now stored.
    Inserted,
    /// A record with the same `(pano_id, subregion_name)` already exists;
    /// the insert was ignored.
    DuplicateIgnored,
}

/// Store statistics.
#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    /// Total records across all regions.
    pub record_count: usize,
    /// Number of regions.
    pub region_count: usize,
    /// Duplicate inserts ignored since the store was created.
    pub duplicates_ignored: u64,
}

/// Trait for panorama record store implementations.
///
/// The two query methods are the contracts the statistics engine depends on:
/// `records` ("all records of a region", deterministic order) and
/// `records_in_bbox` (the coarse range pre-filter used by the polygon
/// aggregator).
pub trait RecordStore {
    /// Insert a record into a region, ignoring duplicates.
    fn insert(&mut self, region: &str, record: PanoramaRecord) -> Result<InsertOutcome>;

    /// All records of a region, in `(pano_id, subregion_name)` key order.
    ///
    /// An unknown region is an empty region, not an error.
    fn records(&self, region: &str) -> Result<Vec<PanoramaRecord>>;

    /// Records whose `pano_point` falls within the rectangle, boundary
    /// inclusive.
    fn records_in_bbox(&self, region: &str, bbox: &Rect) -> Result<Vec<PanoramaRecord>>;

    /// Distinct subregion labels present in a region.
    fn subregions(&self, region: &str) -> Result<Vec<String>>;

    /// All region names, sorted.
    fn regions(&self) -> Vec<String>;

    /// Number of records in a region.
    fn len(&self, region: &str) -> usize;

    /// Whether a region holds no records.
    fn is_empty(&self, region: &str) -> bool {
        self.len(region) == 0
    }

    /// Remove a region and all of its records. Returns the number removed.
    fn clear_region(&mut self, region: &str) -> Result<usize>;

    /// Record that a panorama image has been retrieved: stamps
    /// `download_date` and `saved_path` on the identified record.
    fn mark_downloaded(
        &mut self,
        region: &str,
        pano_id: &str,
        subregion: &str,
        date: chrono::NaiveDate,
        saved_path: &str,
    ) -> Result<()>;

    /// Store statistics.
    fn stats(&self) -> StoreStats;
}

/// A pano point in the per-region R-tree.
#[derive(Debug)]
struct IndexedPano {
    x: f64,
    y: f64,
    pano_id: String,
    subregion: String,
}

impl RTreeObject for IndexedPano {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

#[derive(Debug, Default)]
struct RegionData {
    records: BTreeMap<(String, String), PanoramaRecord>,
    index: RTree<IndexedPano>,
}

/// In-memory record store, partitioned by region.
///
/// Records are held in a B-tree keyed by `(pano_id, subregion_name)` for
/// deterministic iteration, with an R-tree over pano points per region
/// serving the bounding-box range queries.
///
/// # Examples
///
/// ```rust
/// use panostat::{CaptureDate, MemoryStore, PanoramaRecord, RecordStore, InsertOutcome};
///
/// let mut store = MemoryStore::new();
/// let record = PanoramaRecord::new(
///     "1011",
///     "pano-a",
///     CaptureDate::new(2015, 6)?,
///     (4.89, 52.37),
///     (4.8901, 52.3702),
/// );
///
/// assert_eq!(store.insert("postcodes", record.clone())?, InsertOutcome::Inserted);
/// assert_eq!(store.insert("postcodes", record)?, InsertOutcome::DuplicateIgnored);
/// assert_eq!(store.len("postcodes"), 1);
/// # Ok::<(), panostat::PanostatError>(())
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    regions: BTreeMap<String, RegionData>,
    duplicates_ignored: u64,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk-insert a batch of records, ignoring duplicates.
    ///
    /// Returns the number actually inserted. A duplicate never aborts the
    /// batch; a validation error (bad region name) does.
    pub fn insert_batch(
        &mut self,
        region: &str,
        records: impl IntoIterator<Item = PanoramaRecord>,
    ) -> Result<usize> {
        let mut inserted = 0;
        for record in records {
            if self.insert(region, record)? == InsertOutcome::Inserted {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    pub(crate) fn region_records(
        &self,
    ) -> impl Iterator<Item = (&str, impl Iterator<Item = &PanoramaRecord>)> {
        self.regions
            .iter()
            .map(|(name, data)| (name.as_str(), data.records.values()))
    }
}

/// Validate a region name the way a table name would be, so that a region
/// can never smuggle structure into keys or snapshot layouts.
pub fn validate_region_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(PanostatError::InvalidRegion(
            "region name cannot be empty".into(),
        ));
    }

    if name.contains(REGION_SEPARATOR) {
        return Err(PanostatError::InvalidRegion(format!(
            "region name '{}' cannot contain separator '{}'",
            name, REGION_SEPARATOR
        )));
    }

    if name.contains('\0') {
        return Err(PanostatError::InvalidRegion(
            "region name cannot contain null bytes".into(),
        ));
    }

    if name.len() > 255 {
        return Err(PanostatError::InvalidRegion(
            "region name cannot exceed 255 characters".into(),
        ));
    }

    Ok(())
}

impl RecordStore for MemoryStore {
    fn insert(&mut self, region: &str, record: PanoramaRecord) -> Result<InsertOutcome> {
        validate_region_name(region)?;

        let data = self.regions.entry(region.to_string()).or_default();
        let key = (record.pano_id.clone(), record.subregion_name.clone());

        if data.records.contains_key(&key) {
            self.duplicates_ignored += 1;
            log::debug!(
                "duplicate entry for pano '{}' in subregion '{}' ignored",
                key.0,
                key.1
            );
            return Ok(InsertOutcome::DuplicateIgnored);
        }

        data.index.insert(IndexedPano {
            x: record.pano_point.0,
            y: record.pano_point.1,
            pano_id: key.0.clone(),
            subregion: key.1.clone(),
        });
        data.records.insert(key, record);

        Ok(InsertOutcome::Inserted)
    }

    fn records(&self, region: &str) -> Result<Vec<PanoramaRecord>> {
        validate_region_name(region)?;
        Ok(self
            .regions
            .get(region)
            .map(|data| data.records.values().cloned().collect())
            .unwrap_or_default())
    }

    fn records_in_bbox(&self, region: &str, bbox: &Rect) -> Result<Vec<PanoramaRecord>> {
        validate_region_name(region)?;

        let Some(data) = self.regions.get(region) else {
            return Ok(Vec::new());
        };

        let envelope = AABB::from_corners(
            [bbox.min().x, bbox.min().y],
            [bbox.max().x, bbox.max().y],
        );

        let mut hits: Vec<&IndexedPano> = data.index.locate_in_envelope(&envelope).collect();
        // R-tree iteration order is unspecified; restore key order.
        hits.sort_by(|a, b| (&a.pano_id, &a.subregion).cmp(&(&b.pano_id, &b.subregion)));

        Ok(hits
            .into_iter()
            .filter_map(|hit| {
                data.records
                    .get(&(hit.pano_id.clone(), hit.subregion.clone()))
                    .cloned()
            })
            .collect())
    }

    fn subregions(&self, region: &str) -> Result<Vec<String>> {
        validate_region_name(region)?;

        let Some(data) = self.regions.get(region) else {
            return Ok(Vec::new());
        };

        let mut labels: Vec<String> = data
            .records
            .values()
            .map(|r| r.subregion_name.clone())
            .collect();
        labels.sort();
        labels.dedup();
        Ok(labels)
    }

    fn regions(&self) -> Vec<String> {
        self.regions.keys().cloned().collect()
    }

    fn len(&self, region: &str) -> usize {
        self.regions
            .get(region)
            .map(|data| data.records.len())
            .unwrap_or(0)
    }

    fn clear_region(&mut self, region: &str) -> Result<usize> {
        validate_region_name(region)?;
        Ok(self
            .regions
            .remove(region)
            .map(|data| data.records.len())
            .unwrap_or(0))
    }

    fn mark_downloaded(
        &mut self,
        region: &str,
        pano_id: &str,
        subregion: &str,
        date: chrono::NaiveDate,
        saved_path: &str,
    ) -> Result<()> {
        validate_region_name(region)?;

        let record = self
            .regions
            .get_mut(region)
            .and_then(|data| {
                data.records
                    .get_mut(&(pano_id.to_string(), subregion.to_string()))
            })
            .ok_or_else(|| PanostatError::UnknownRecord {
                region: region.to_string(),
                pano_id: pano_id.to_string(),
                subregion: subregion.to_string(),
            })?;

        record.download_date = Some(date);
        record.saved_path = Some(saved_path.to_string());
        Ok(())
    }

    fn stats(&self) -> StoreStats {
        StoreStats {
            record_count: self.regions.values().map(|d| d.records.len()).sum(),
            region_count: self.regions.len(),
            duplicates_ignored: self.duplicates_ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CaptureDate;
    use geo::coord;

    fn record(pano_id: &str, subregion: &str, x: f64, y: f64) -> PanoramaRecord {
        PanoramaRecord::new(
            subregion,
            pano_id,
            CaptureDate::new(2016, 4).unwrap(),
            (x, y),
            (x, y),
        )
    }

    fn bbox(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Rect {
        Rect::new(coord! { x: min_x, y: min_y }, coord! { x: max_x, y: max_y })
    }

    #[test]
    fn test_insert_and_query() {
        let mut store = MemoryStore::new();
        store
            .insert("ams", record("a", "1011", 4.89, 52.37))
            .unwrap();
        store
            .insert("ams", record("b", "1011", 4.91, 52.38))
            .unwrap();

        let all = store.records("ams").unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].pano_id, "a");
        assert_eq!(all[1].pano_id, "b");
    }

    #[test]
    fn test_duplicate_insert_is_ignored_not_fatal() {
        let mut store = MemoryStore::new();
        let rec = record("a", "1011", 4.89, 52.37);

        assert_eq!(
            store.insert("ams", rec.clone()).unwrap(),
            InsertOutcome::Inserted
        );
        assert_eq!(
            store.insert("ams", rec).unwrap(),
            InsertOutcome::DuplicateIgnored
        );
        assert_eq!(store.len("ams"), 1);
        assert_eq!(store.stats().duplicates_ignored, 1);
    }

    #[test]
    fn test_same_pano_in_different_subregions_is_not_a_duplicate() {
        let mut store = MemoryStore::new();
        store
            .insert("ams", record("a", "1011", 4.89, 52.37))
            .unwrap();
        store
            .insert("ams", record("a", "1012", 4.89, 52.37))
            .unwrap();
        assert_eq!(store.len("ams"), 2);
    }

    #[test]
    fn test_insert_batch_continues_past_duplicates() {
        let mut store = MemoryStore::new();
        let batch = vec![
            record("a", "1011", 4.89, 52.37),
            record("a", "1011", 4.89, 52.37),
            record("b", "1011", 4.90, 52.38),
        ];

        let inserted = store.insert_batch("ams", batch).unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(store.len("ams"), 2);
    }

    #[test]
    fn test_bbox_query_is_boundary_inclusive() {
        let mut store = MemoryStore::new();
        store
            .insert("ams", record("inside", "1011", 4.895, 52.375))
            .unwrap();
        store
            .insert("ams", record("edge", "1011", 4.89, 52.37))
            .unwrap();
        store
            .insert("ams", record("outside", "1011", 5.10, 52.60))
            .unwrap();

        let hits = store
            .records_in_bbox("ams", &bbox(4.89, 52.37, 4.90, 52.38))
            .unwrap();
        let ids: Vec<&str> = hits.iter().map(|r| r.pano_id.as_str()).collect();
        assert_eq!(ids, vec!["edge", "inside"]);
    }

    #[test]
    fn test_unknown_region_is_empty_not_error() {
        let store = MemoryStore::new();
        assert!(store.records("nowhere").unwrap().is_empty());
        assert!(
            store
                .records_in_bbox("nowhere", &bbox(0.0, 0.0, 1.0, 1.0))
                .unwrap()
                .is_empty()
        );
        assert_eq!(store.len("nowhere"), 0);
        assert!(store.is_empty("nowhere"));
    }

    #[test]
    fn test_region_name_validation() {
        let mut store = MemoryStore::new();
        assert!(
            store
                .insert("", record("a", "1011", 0.0, 0.0))
                .is_err()
        );
        assert!(
            store
                .insert("bad::name", record("a", "1011", 0.0, 0.0))
                .is_err()
        );
        assert!(validate_region_name(&"x".repeat(256)).is_err());
        assert!(validate_region_name("postcodes_ams").is_ok());
    }

    #[test]
    fn test_clear_region() {
        let mut store = MemoryStore::new();
        store
            .insert("ams", record("a", "1011", 4.89, 52.37))
            .unwrap();
        store
            .insert("ams", record("b", "1011", 4.90, 52.38))
            .unwrap();

        assert_eq!(store.clear_region("ams").unwrap(), 2);
        assert!(store.records("ams").unwrap().is_empty());
        assert_eq!(store.clear_region("ams").unwrap(), 0);
    }

    #[test]
    fn test_mark_downloaded() {
        let mut store = MemoryStore::new();
        store
            .insert("ams", record("a", "1011", 4.89, 52.37))
            .unwrap();

        let date = chrono::NaiveDate::from_ymd_opt(2021, 3, 14).unwrap();
        store
            .mark_downloaded("ams", "a", "1011", date, "imgs/a.jpg")
            .unwrap();

        let rec = &store.records("ams").unwrap()[0];
        assert_eq!(rec.download_date, Some(date));
        assert_eq!(rec.saved_path.as_deref(), Some("imgs/a.jpg"));

        let missing = store.mark_downloaded("ams", "zz", "1011", date, "x");
        assert!(matches!(
            missing,
            Err(PanostatError::UnknownRecord { .. })
        ));
    }

    #[test]
    fn test_subregions_sorted_distinct() {
        let mut store = MemoryStore::new();
        store
            .insert("ams", record("a", "1012", 4.89, 52.37))
            .unwrap();
        store
            .insert("ams", record("b", "1011", 4.90, 52.38))
            .unwrap();
        store
            .insert("ams", record("c", "1011", 4.91, 52.39))
            .unwrap();

        assert_eq!(store.subregions("ams").unwrap(), vec!["1011", "1012"]);
    }
}
