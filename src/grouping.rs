//! Spatial grouping of panorama records by shared location.
//!
//! The grouper partitions a coordinate-sorted record sequence into runs of
//! records that sit at the same location, at a configurable coordinate
//! precision. It is a single adjacent-pair scan, not a full partition: the
//! input MUST already be sorted by the selected (x, y) pair, and the fast
//! path does not verify that. Unsorted input silently yields groups that do
//! not reflect true spatial adjacency. Use [`group_by_location_checked`] to
//! have the ordering precondition enforced, and [`sort_by_location`] to
//! establish it.

use crate::error::{PanostatError, Result};
use crate::types::{CaptureDate, CoordinateSource, PanoramaRecord};

/// A run of records sharing one location at the grouping precision.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationGroup {
    /// Truncated `x-y` pair of the group's first member.
    pub key: String,
    /// Members in scan order. Never empty.
    pub records: Vec<PanoramaRecord>,
}

impl LocationGroup {
    /// Capture dates of all members, in member order.
    pub fn capture_dates(&self) -> Vec<CaptureDate> {
        self.records.iter().map(|r| r.capture_date).collect()
    }
}

/// Truncate a coordinate to its first `precision` display characters.
///
/// Comparison is over the coordinate's shortest display form, so `precision`
/// counts characters (including the sign and decimal point), not digits.
/// `None` keeps full precision.
pub fn truncate_coordinate(value: f64, precision: Option<usize>) -> String {
    let repr = value.to_string();
    match precision {
        Some(n) => repr.chars().take(n).collect(),
        None => repr,
    }
}

/// Group a sorted record sequence by shared location.
///
/// Walks adjacent pairs, comparing the selected coordinate pair truncated to
/// `precision` characters. A group is closed only when BOTH the truncated x
/// AND the truncated y differ from the running previous record; if either
/// coordinate alone stays equal the group continues. This asymmetric closing
/// condition de-noises floating coordinate jitter along one axis and is
/// intentional (see the companion tests for what the either-axis variant
/// would produce instead).
///
/// Empty input returns no groups; a single record returns one group of one.
///
/// # Preconditions
///
/// `records` must be sorted by the selected (x, y) pair. This is a caller
/// responsibility and is not validated here.
///
/// # Examples
///
/// ```rust
/// use panostat::{CaptureDate, CoordinateSource, PanoramaRecord};
/// use panostat::grouping::group_by_location;
///
/// let date = CaptureDate::new(2015, 6)?;
/// let records = vec![
///     PanoramaRecord::new("a", "p1", date, (1.0, 1.0), (1.0, 1.0)),
///     PanoramaRecord::new("a", "p2", date, (1.0, 1.0), (1.0, 1.0)),
///     PanoramaRecord::new("a", "p3", date, (2.0, 2.0), (2.0, 2.0)),
/// ];
///
/// let groups = group_by_location(&records, CoordinateSource::Pano, None);
/// assert_eq!(groups.len(), 2);
/// assert_eq!(groups[0].records.len(), 2);
/// assert_eq!(groups[1].records.len(), 1);
/// # Ok::<(), panostat::PanostatError>(())
/// ```
pub fn group_by_location(
    records: &[PanoramaRecord],
    source: CoordinateSource,
    precision: Option<usize>,
) -> Vec<LocationGroup> {
    let mut groups = Vec::new();
    let mut iter = records.iter();

    let Some(first) = iter.next() else {
        return groups;
    };

    let mut current: Vec<PanoramaRecord> = vec![first.clone()];
    let mut prev = first;

    for record in iter {
        let (x, y) = source.xy(record);
        let (prev_x, prev_y) = source.xy(prev);

        if truncate_coordinate(x, precision) != truncate_coordinate(prev_x, precision)
            && truncate_coordinate(y, precision) != truncate_coordinate(prev_y, precision)
        {
            groups.push(close_group(current, source, precision));
            current = Vec::new();
        }

        current.push(record.clone());
        prev = record;
    }

    groups.push(close_group(current, source, precision));
    groups
}

/// [`group_by_location`] with the ordering precondition enforced.
///
/// Returns [`PanostatError::UnsortedRecords`] naming the first out-of-order
/// index instead of silently producing wrong groups.
pub fn group_by_location_checked(
    records: &[PanoramaRecord],
    source: CoordinateSource,
    precision: Option<usize>,
) -> Result<Vec<LocationGroup>> {
    if let Some(index) = first_unsorted_index(records, source) {
        return Err(PanostatError::UnsortedRecords { index });
    }
    Ok(group_by_location(records, source, precision))
}

/// Sort records by the selected (x, y) pair, establishing the grouper's
/// ordering precondition.
pub fn sort_by_location(records: &mut [PanoramaRecord], source: CoordinateSource) {
    records.sort_by(|a, b| {
        let (ax, ay) = source.xy(a);
        let (bx, by) = source.xy(b);
        ax.total_cmp(&bx).then(ay.total_cmp(&by))
    });
}

fn close_group(
    records: Vec<PanoramaRecord>,
    source: CoordinateSource,
    precision: Option<usize>,
) -> LocationGroup {
    let (x, y) = source.xy(&records[0]);
    LocationGroup {
        key: format!(
            "{}-{}",
            truncate_coordinate(x, precision),
            truncate_coordinate(y, precision)
        ),
        records,
    }
}

fn first_unsorted_index(records: &[PanoramaRecord], source: CoordinateSource) -> Option<usize> {
    records
        .windows(2)
        .position(|pair| {
            let (ax, ay) = source.xy(&pair[0]);
            let (bx, by) = source.xy(&pair[1]);
            ax.total_cmp(&bx).then(ay.total_cmp(&by)) == std::cmp::Ordering::Greater
        })
        .map(|i| i + 1)
}
