//! Temporal interval statistics over capture dates.
//!
//! Capture dates only carry year-month resolution, so all interval math here
//! is month arithmetic; where day precision is needed (mean dates, epoch
//! offsets) a capture date resolves to the first day of its month, which is
//! the crate-wide documented rounding rule.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{PanostatError, Result};
use crate::types::CaptureDate;

/// Public launch of the imagery service; day-count fields in polygon
/// statistics are expressed relative to this date.
static SERVICE_EPOCH: Lazy<NaiveDate> =
    Lazy::new(|| NaiveDate::from_ymd_opt(2005, 1, 1).expect("valid epoch date"));

/// The imagery service's public launch date (2005-01-01).
pub fn service_epoch() -> NaiveDate {
    *SERVICE_EPOCH
}

/// Days elapsed from the service epoch to `date` (negative before launch).
pub fn days_since_service_epoch(date: NaiveDate) -> i64 {
    (date - service_epoch()).num_days()
}

/// Interval statistics over a set of capture timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalStats {
    /// Oldest capture.
    pub earliest: CaptureDate,
    /// Newest capture.
    pub latest: CaptureDate,
    /// Number of unique (year, month) pairs; duplicate timestamps collapse.
    pub distinct_count: usize,
    /// Whole months from earliest to latest.
    pub month_delta: i32,
    /// `month_delta / 12`, fractional.
    pub year_delta: f64,
}

/// Compute interval statistics over a non-empty timestamp sequence.
///
/// `month_delta` is `12 * (latest.year - earliest.year) + (latest.month -
/// earliest.month)`; `year_delta` is the same span in fractional years.
/// The distinct count is over unique timestamps, not raw records: two
/// panoramas captured in the same month at different locations count once.
///
/// # Errors
///
/// Returns [`PanostatError::EmptyTimestamps`] on empty input; an empty
/// sequence has no interval to measure and silently returning zeros would
/// be indistinguishable from a single-capture location.
///
/// # Examples
///
/// ```rust
/// use panostat::CaptureDate;
/// use panostat::temporal::interval_stats;
///
/// let timestamps = vec![
///     CaptureDate::new(2010, 1)?,
///     CaptureDate::new(2010, 1)?,
///     CaptureDate::new(2012, 7)?,
/// ];
/// let stats = interval_stats(&timestamps)?;
///
/// assert_eq!(stats.month_delta, 30);
/// assert_eq!(stats.year_delta, 2.5);
/// assert_eq!(stats.distinct_count, 2);
/// # Ok::<(), panostat::PanostatError>(())
/// ```
pub fn interval_stats(timestamps: &[CaptureDate]) -> Result<IntervalStats> {
    let first = timestamps.first().ok_or(PanostatError::EmptyTimestamps)?;

    let mut earliest = *first;
    let mut latest = *first;
    let mut distinct: BTreeSet<CaptureDate> = BTreeSet::new();

    for &ts in timestamps {
        earliest = earliest.min(ts);
        latest = latest.max(ts);
        distinct.insert(ts);
    }

    let month_delta = months_between(earliest, latest);

    Ok(IntervalStats {
        earliest,
        latest,
        distinct_count: distinct.len(),
        month_delta,
        year_delta: f64::from(month_delta) / 12.0,
    })
}

/// Whole months from `earliest` to `latest`.
pub fn months_between(earliest: CaptureDate, latest: CaptureDate) -> i32 {
    12 * (latest.year() - earliest.year()) + (latest.month() as i32 - earliest.month() as i32)
}

/// Arithmetic mean of capture dates, at day precision.
///
/// Each timestamp resolves to the first day of its month; the mean is taken
/// over days-since-CE and rounded to the nearest whole day.
///
/// # Errors
///
/// Returns [`PanostatError::EmptyTimestamps`] on empty input.
pub fn mean_capture_date(timestamps: &[CaptureDate]) -> Result<NaiveDate> {
    if timestamps.is_empty() {
        return Err(PanostatError::EmptyTimestamps);
    }

    let total: i64 = timestamps
        .iter()
        .map(|ts| i64::from(ts.first_day().num_days_from_ce()))
        .sum();
    let mean = (total as f64 / timestamps.len() as f64).round() as i32;

    NaiveDate::from_num_days_from_ce_opt(mean)
        .ok_or_else(|| PanostatError::InvalidInput("mean capture date out of range".into()))
}
