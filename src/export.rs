//! CSV export of assembled statistic rows.
//!
//! A thin adapter over the csv crate: it writes whatever fixed-width rows it
//! is handed and reads them back. The row shape itself is owned by
//! [`StatRow`](crate::stats::StatRow).

use std::path::Path;

use crate::error::Result;
use crate::stats::StatRow;

/// Write generic delimited rows, with an optional header row first.
pub fn export_rows<P, R>(path: P, rows: R, header: Option<&[&str]>) -> Result<()>
where
    P: AsRef<Path>,
    R: IntoIterator<Item = Vec<String>>,
{
    let mut writer = csv::Writer::from_path(path)?;

    if let Some(header) = header {
        writer.write_record(header)?;
    }

    for row in rows {
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write assembled stat rows with the standard header.
///
/// # Examples
///
/// ```rust,no_run
/// use panostat::{CaptureDate, CoordinateSource, PanoramaRecord};
/// use panostat::grouping::group_by_location;
/// use panostat::stats::assemble_stats;
/// use panostat::export::export_stat_rows;
///
/// let records = vec![
///     PanoramaRecord::new("1011", "p1", CaptureDate::new(2010, 1)?, (1.0, 1.0), (1.0, 1.0)),
/// ];
/// let groups = group_by_location(&records, CoordinateSource::Pano, None);
/// let rows = assemble_stats(&groups, CoordinateSource::Pano)?;
///
/// export_stat_rows("pano_timestats.csv", &rows)?;
/// # Ok::<(), panostat::PanostatError>(())
/// ```
pub fn export_stat_rows<P: AsRef<Path>>(path: P, rows: &[StatRow]) -> Result<()> {
    export_rows(
        path,
        rows.iter().map(StatRow::to_fields),
        Some(&StatRow::HEADER),
    )
}

/// Read stat rows back from a file written by [`export_stat_rows`].
pub fn read_stat_rows<P: AsRef<Path>>(path: P) -> Result<Vec<StatRow>> {
    let mut reader = csv::Reader::from_path(path)?;

    reader
        .records()
        .map(|record| {
            let record = record?;
            let fields: Vec<String> = record.iter().map(str::to_string).collect();
            StatRow::from_fields(&fields)
        })
        .collect()
}
