//! Assembly of flat statistic rows from grouped records.
//!
//! The assembler joins the grouper's output with the interval calculator and
//! flattens the result into fixed-width rows. The row shape is the contract
//! the export adapter honors; the field mapping lives here so the adapter
//! stays a dumb row writer.

use serde::{Deserialize, Serialize};

use crate::error::{PanostatError, Result};
use crate::grouping::LocationGroup;
use crate::temporal::interval_stats;
use crate::types::{CaptureDate, CoordinateSource};

/// One flat statistics row for a location group.
///
/// The subregion label and representative coordinate are taken from the
/// group's first member — first as encountered during grouping, which makes
/// the choice arbitrary but reproducible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRow {
    pub subregion: String,
    pub x: f64,
    pub y: f64,
    pub earliest: CaptureDate,
    pub latest: CaptureDate,
    pub month_delta: i32,
    pub year_delta: f64,
    pub distinct_count: usize,
}

impl StatRow {
    /// Column names, in field order.
    pub const HEADER: [&'static str; 8] = [
        "subregion_name",
        "x",
        "y",
        "earliest",
        "latest",
        "month_delta",
        "year_delta",
        "distinct_count",
    ];

    /// Render the row as delimited-file fields, in [`Self::HEADER`] order.
    pub fn to_fields(&self) -> Vec<String> {
        vec![
            self.subregion.clone(),
            self.x.to_string(),
            self.y.to_string(),
            self.earliest.to_string(),
            self.latest.to_string(),
            self.month_delta.to_string(),
            self.year_delta.to_string(),
            self.distinct_count.to_string(),
        ]
    }

    /// Parse a row back from delimited-file fields.
    pub fn from_fields(fields: &[String]) -> Result<Self> {
        if fields.len() != Self::HEADER.len() {
            return Err(PanostatError::InvalidInput(format!(
                "expected {} fields, got {}",
                Self::HEADER.len(),
                fields.len()
            )));
        }

        let numeric = |index: usize| -> Result<f64> {
            fields[index].parse().map_err(|_| {
                PanostatError::InvalidInput(format!(
                    "field '{}' is not numeric: '{}'",
                    Self::HEADER[index], fields[index]
                ))
            })
        };

        Ok(Self {
            subregion: fields[0].clone(),
            x: numeric(1)?,
            y: numeric(2)?,
            earliest: fields[3].parse()?,
            latest: fields[4].parse()?,
            month_delta: numeric(5)? as i32,
            year_delta: numeric(6)?,
            distinct_count: numeric(7)? as usize,
        })
    }
}

/// Assemble one statistics row per location group, in group order.
///
/// Deterministic: the same grouping output always yields the same row
/// sequence.
///
/// # Examples
///
/// ```rust
/// use panostat::{CaptureDate, CoordinateSource, PanoramaRecord};
/// use panostat::grouping::group_by_location;
/// use panostat::stats::assemble_stats;
///
/// let records = vec![
///     PanoramaRecord::new("1011", "p1", CaptureDate::new(2010, 1)?, (1.0, 1.0), (1.0, 1.0)),
///     PanoramaRecord::new("1011", "p2", CaptureDate::new(2012, 7)?, (1.0, 1.0), (1.0, 1.0)),
/// ];
///
/// let groups = group_by_location(&records, CoordinateSource::Pano, None);
/// let rows = assemble_stats(&groups, CoordinateSource::Pano)?;
///
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].month_delta, 30);
/// # Ok::<(), panostat::PanostatError>(())
/// ```
pub fn assemble_stats(
    groups: &[LocationGroup],
    source: CoordinateSource,
) -> Result<Vec<StatRow>> {
    groups
        .iter()
        .map(|group| {
            let stats = interval_stats(&group.capture_dates())?;
            let first = &group.records[0];
            let (x, y) = source.xy(first);

            Ok(StatRow {
                subregion: first.subregion_name.clone(),
                x,
                y,
                earliest: stats.earliest,
                latest: stats.latest,
                month_delta: stats.month_delta,
                year_delta: stats.year_delta,
                distinct_count: stats.distinct_count,
            })
        })
        .collect()
}
