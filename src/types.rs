//! Core data types and configuration for panostat.
//!
//! This module defines the typed panorama record that replaces ad-hoc
//! positional row access, the year-month capture timestamp, and the
//! serializable crate configuration.

use chrono::NaiveDate;
use geo::Point;
use serde::de::Error as _;
use serde::{Deserialize, Serialize};

/// A capture timestamp at year-month resolution.
///
/// The imagery provider reports no day or time component, so this is the
/// finest granularity a panorama's age can be known at. Ordering is
/// chronological (year first, then month).
///
/// The canonical string form is zero-padded `"YYYY-MM"`; parsing also accepts
/// the provider's unpadded `"YYYY-M"`.
///
/// # Examples
///
/// ```rust
/// use panostat::CaptureDate;
///
/// let a: CaptureDate = "2010-1".parse().unwrap();
/// let b: CaptureDate = "2012-07".parse().unwrap();
/// assert!(a < b);
/// assert_eq!(a.to_string(), "2010-01");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CaptureDate {
    year: i32,
    month: u32,
}

impl CaptureDate {
    /// Create a capture date, validating the month.
    pub fn new(year: i32, month: u32) -> crate::Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(crate::PanostatError::InvalidCaptureDate(format!(
                "{}-{}",
                year, month
            )));
        }
        Ok(Self { year, month })
    }

    /// Calendar year of the capture.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month of the capture (1-12).
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Resolve to day precision as the first day of the month.
    ///
    /// This is the documented rounding rule for all day-level arithmetic over
    /// capture dates (mean dates, epoch offsets, day ranges).
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("month is validated at construction")
    }
}

impl std::str::FromStr for CaptureDate {
    type Err = crate::PanostatError;

    fn from_str(s: &str) -> crate::Result<Self> {
        let invalid = || crate::PanostatError::InvalidCaptureDate(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.trim().parse().map_err(|_| invalid())?;
        let month: u32 = month.trim().parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl std::fmt::Display for CaptureDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl TryFrom<String> for CaptureDate {
    type Error = crate::PanostatError;

    fn try_from(s: String) -> crate::Result<Self> {
        s.parse()
    }
}

impl From<CaptureDate> for String {
    fn from(date: CaptureDate) -> Self {
        date.to_string()
    }
}

/// One discovered panorama: an immutable fact about a capture that exists.
///
/// `(pano_id, subregion_name)` uniquely identifies a record within a region;
/// the store enforces that invariant by silently ignoring duplicate inserts.
///
/// Two coordinates are carried: the `anchor_point` that was queried to
/// discover the panorama, and the `pano_point` the provider reports as the
/// panorama's own location (the provider snaps queries to the nearest
/// capture, so the two usually differ).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanoramaRecord {
    pub subregion_name: String,
    pub pano_id: String,
    pub capture_date: CaptureDate,
    pub anchor_point: (f64, f64),
    pub pano_point: (f64, f64),
    /// Date the record was discovered, set by the discovery workflow.
    #[serde(default)]
    pub lookup_date: Option<NaiveDate>,
    /// Date the image itself was retrieved, set after download.
    #[serde(default)]
    pub download_date: Option<NaiveDate>,
    /// Path the image was saved to, set after download.
    #[serde(default)]
    pub saved_path: Option<String>,
}

impl PanoramaRecord {
    /// Create a record with the discovery-time fields unset.
    pub fn new(
        subregion_name: impl Into<String>,
        pano_id: impl Into<String>,
        capture_date: CaptureDate,
        anchor_point: (f64, f64),
        pano_point: (f64, f64),
    ) -> Self {
        Self {
            subregion_name: subregion_name.into(),
            pano_id: pano_id.into(),
            capture_date,
            anchor_point,
            pano_point,
            lookup_date: None,
            download_date: None,
            saved_path: None,
        }
    }

    /// Set the discovery date.
    pub fn with_lookup_date(mut self, date: NaiveDate) -> Self {
        self.lookup_date = Some(date);
        self
    }

    /// The queried coordinate as a geometry point.
    pub fn anchor(&self) -> Point {
        Point::new(self.anchor_point.0, self.anchor_point.1)
    }

    /// The panorama's reported location as a geometry point.
    pub fn pano(&self) -> Point {
        Point::new(self.pano_point.0, self.pano_point.1)
    }
}

/// Which of a record's two coordinates an operation should read.
///
/// Grouping and stat assembly can run either over the queried anchor points
/// (coverage of the sampling grid) or over the panoramas' own reported
/// locations (coverage of actual captures).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateSource {
    /// The coordinate that was queried to discover the panorama.
    Anchor,
    /// The panorama's own reported location.
    #[default]
    Pano,
}

impl CoordinateSource {
    /// Read the selected (x, y) pair from a record.
    pub fn xy(&self, record: &PanoramaRecord) -> (f64, f64) {
        match self {
            CoordinateSource::Anchor => record.anchor_point,
            CoordinateSource::Pano => record.pano_point,
        }
    }
}

/// Crate configuration.
///
/// Designed to be easily serializable and loadable from JSON or TOML while
/// keeping complexity minimal.
///
/// # Example
///
/// ```rust
/// use panostat::Config;
///
/// let config = Config::default();
///
/// let json = r#"{
///     "group_precision": 6,
///     "grid_resolution": 50.0
/// }"#;
/// let config: Config = Config::from_json(json).unwrap();
/// assert_eq!(config.group_precision, Some(6));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of leading coordinate characters compared when grouping.
    /// `None` compares full precision.
    #[serde(default)]
    pub group_precision: Option<usize>,

    /// Spacing of the sampling grid in the unit of the projected input
    /// geometry (meters for any sensible CRS).
    #[serde(default = "Config::default_grid_resolution")]
    pub grid_resolution: f64,

    /// Numeric no-data value stamped on polygons with zero panoramas.
    #[serde(default = "Config::default_sentinel")]
    pub sentinel: f64,

    /// Pause between provider queries during discovery, in milliseconds.
    #[serde(default = "Config::default_query_pause_ms")]
    pub query_pause_ms: u64,

    /// Backoff before the single retry of a failed provider query, in seconds.
    #[serde(default = "Config::default_retry_backoff_secs")]
    pub retry_backoff_secs: u64,

    /// Metadata endpoint of the imagery provider.
    #[serde(default)]
    pub provider_endpoint: Option<String>,
}

impl Config {
    const fn default_grid_resolution() -> f64 {
        20.0
    }

    const fn default_sentinel() -> f64 {
        -9999.0
    }

    const fn default_query_pause_ms() -> u64 {
        10
    }

    const fn default_retry_backoff_secs() -> u64 {
        30
    }

    /// Set the grouping precision (leading characters compared).
    pub fn with_group_precision(mut self, precision: usize) -> Self {
        assert!(precision > 0, "Group precision must be greater than zero");
        self.group_precision = Some(precision);
        self
    }

    /// Set the sampling grid resolution.
    pub fn with_grid_resolution(mut self, resolution: f64) -> Self {
        self.grid_resolution = resolution;
        self
    }

    /// Set the numeric no-data sentinel.
    pub fn with_sentinel(mut self, sentinel: f64) -> Self {
        self.sentinel = sentinel;
        self
    }

    /// Set the provider metadata endpoint.
    pub fn with_provider_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.provider_endpoint = Some(endpoint.into());
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(precision) = self.group_precision
            && precision == 0
        {
            return Err(
                "Group precision must be greater than zero (zero would merge all records into one group)"
                    .to_string(),
            );
        }

        if !self.grid_resolution.is_finite() || self.grid_resolution <= 0.0 {
            return Err("Grid resolution must be positive and finite".to_string());
        }

        if !self.sentinel.is_finite() {
            return Err("Sentinel must be finite".to_string());
        }

        Ok(())
    }

    /// Load configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(serde_json::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load configuration from a TOML string (requires toml feature).
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as a TOML string (requires toml feature).
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            group_precision: None,
            grid_resolution: Self::default_grid_resolution(),
            sentinel: Self::default_sentinel(),
            query_pause_ms: Self::default_query_pause_ms(),
            retry_backoff_secs: Self::default_retry_backoff_secs(),
            provider_endpoint: None,
        }
    }
}
