//! Panorama metadata discovery.
//!
//! The discovery workflow walks a set of sample points, asks the imagery
//! provider which panoramas exist at each, and files the answers into the
//! record store. All rate limiting, retry, and backoff lives here at the I/O
//! boundary; the statistics core never sleeps or retries.

use std::thread;
use std::time::Duration;

use chrono::Local;
use geo::Point;
use serde::Deserialize;

use crate::error::{PanostatError, Result};
use crate::store::{InsertOutcome, RecordStore};
use crate::types::{CaptureDate, Config, PanoramaRecord};

/// One panorama as reported by the metadata provider.
///
/// The provider omits `year`/`month` for captures it cannot date; those
/// entries are skipped during conversion since a record without a capture
/// date cannot participate in any statistic.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderPanorama {
    #[serde(alias = "panoid")]
    pub pano_id: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub month: Option<u32>,
}

/// Capability to list the panoramas discoverable at a coordinate.
pub trait PanoProvider {
    /// All panoramas the provider reports for a WGS84 point.
    fn panoramas_at(&self, point: &Point) -> Result<Vec<ProviderPanorama>>;
}

/// Blocking HTTP metadata client.
///
/// Issues `GET {endpoint}?lat={lat}&lon={lon}` and expects a JSON array of
/// panorama entries. A failed query is retried once after the configured
/// backoff before the error is surfaced.
pub struct HttpPanoProvider {
    client: reqwest::blocking::Client,
    endpoint: String,
    retry_backoff: Duration,
}

impl HttpPanoProvider {
    /// Create a provider for the given metadata endpoint.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PanostatError::Provider(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            retry_backoff: Duration::from_secs(Config::default().retry_backoff_secs),
        })
    }

    /// Create a provider from crate configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let endpoint = config.provider_endpoint.as_deref().ok_or_else(|| {
            PanostatError::InvalidInput("no provider endpoint configured".into())
        })?;

        Ok(Self::new(endpoint)?.with_retry_backoff(Duration::from_secs(config.retry_backoff_secs)))
    }

    /// Set the backoff before the single retry.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    fn fetch(&self, point: &Point) -> reqwest::Result<Vec<ProviderPanorama>> {
        self.client
            .get(&self.endpoint)
            .query(&[("lat", point.y()), ("lon", point.x())])
            .send()?
            .error_for_status()?
            .json()
    }
}

impl PanoProvider for HttpPanoProvider {
    fn panoramas_at(&self, point: &Point) -> Result<Vec<ProviderPanorama>> {
        match self.fetch(point) {
            Ok(panoramas) => Ok(panoramas),
            Err(first) => {
                log::warn!(
                    "provider query failed ({}), retrying in {}s",
                    first,
                    self.retry_backoff.as_secs()
                );
                thread::sleep(self.retry_backoff);
                self.fetch(point)
                    .map_err(|e| PanostatError::Provider(e.to_string()))
            }
        }
    }
}

/// Counters for one discovery run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoverySummary {
    pub points_queried: usize,
    pub inserted: usize,
    pub duplicates_ignored: usize,
    pub skipped_dateless: usize,
}

/// Convert provider entries at an anchor point into records.
///
/// Entries without a capture date are dropped; entries with an impossible
/// month are dropped with a warning rather than poisoning the batch.
pub fn records_from_panoramas(
    anchor: &Point,
    subregion: &str,
    panoramas: &[ProviderPanorama],
    lookup_date: chrono::NaiveDate,
) -> (Vec<PanoramaRecord>, usize) {
    let mut records = Vec::new();
    let mut skipped = 0;

    for pano in panoramas {
        let (Some(year), Some(month)) = (pano.year, pano.month) else {
            skipped += 1;
            continue;
        };

        let capture_date = match CaptureDate::new(year, month) {
            Ok(date) => date,
            Err(e) => {
                log::warn!("skipping pano '{}': {}", pano.pano_id, e);
                skipped += 1;
                continue;
            }
        };

        records.push(
            PanoramaRecord::new(
                subregion,
                &pano.pano_id,
                capture_date,
                (anchor.x(), anchor.y()),
                (pano.lon, pano.lat),
            )
            .with_lookup_date(lookup_date),
        );
    }

    (records, skipped)
}

/// Discover panoramas at every sample point and store them.
///
/// Each point is queried in turn with a pause in between to stay polite to
/// the provider. Duplicate records (re-discovered panoramas) are counted and
/// ignored; a provider failure after its retry aborts the run with an error,
/// leaving everything stored so far in place for a resumed run.
pub fn discover_at_points<S, P>(
    store: &mut S,
    region: &str,
    subregion: &str,
    points: &[Point],
    provider: &P,
    pause: Duration,
) -> Result<DiscoverySummary>
where
    S: RecordStore + ?Sized,
    P: PanoProvider + ?Sized,
{
    let mut summary = DiscoverySummary::default();
    let lookup_date = Local::now().date_naive();

    for point in points {
        let panoramas = provider.panoramas_at(point)?;
        let (records, skipped) =
            records_from_panoramas(point, subregion, &panoramas, lookup_date);
        summary.skipped_dateless += skipped;

        for record in records {
            match store.insert(region, record)? {
                InsertOutcome::Inserted => summary.inserted += 1,
                InsertOutcome::DuplicateIgnored => summary.duplicates_ignored += 1,
            }
        }

        summary.points_queried += 1;
        thread::sleep(pause);
    }

    log::info!(
        "discovered {} panoramas over {} points in subregion '{}' ({} duplicates, {} undated)",
        summary.inserted,
        summary.points_queried,
        subregion,
        summary.duplicates_ignored,
        summary.skipped_dateless
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    struct FixedProvider {
        panoramas: Vec<ProviderPanorama>,
    }

    impl PanoProvider for FixedProvider {
        fn panoramas_at(&self, _point: &Point) -> Result<Vec<ProviderPanorama>> {
            Ok(self.panoramas.clone())
        }
    }

    fn pano(pano_id: &str, year: Option<i32>, month: Option<u32>) -> ProviderPanorama {
        ProviderPanorama {
            pano_id: pano_id.to_string(),
            lat: 52.37,
            lon: 4.89,
            year,
            month,
        }
    }

    #[test]
    fn test_records_from_panoramas_skips_dateless() {
        let anchor = Point::new(4.89, 52.37);
        let panoramas = vec![
            pano("dated", Some(2014), Some(6)),
            pano("undated", None, None),
            pano("half-dated", Some(2014), None),
        ];

        let lookup = chrono::NaiveDate::from_ymd_opt(2021, 5, 1).unwrap();
        let (records, skipped) = records_from_panoramas(&anchor, "1011", &panoramas, lookup);

        assert_eq!(records.len(), 1);
        assert_eq!(skipped, 2);
        assert_eq!(records[0].pano_id, "dated");
        assert_eq!(records[0].anchor_point, (4.89, 52.37));
        assert_eq!(records[0].pano_point, (4.89, 52.37));
        assert_eq!(records[0].lookup_date, Some(lookup));
    }

    #[test]
    fn test_records_from_panoramas_rejects_impossible_month() {
        let anchor = Point::new(4.89, 52.37);
        let panoramas = vec![pano("bad-month", Some(2014), Some(13))];

        let lookup = chrono::NaiveDate::from_ymd_opt(2021, 5, 1).unwrap();
        let (records, skipped) = records_from_panoramas(&anchor, "1011", &panoramas, lookup);

        assert!(records.is_empty());
        assert_eq!(skipped, 1);
    }

    #[test]
    fn test_discover_counts_duplicates() {
        let mut store = MemoryStore::new();
        let provider = FixedProvider {
            panoramas: vec![pano("a", Some(2014), Some(6)), pano("b", Some(2015), Some(2))],
        };

        let points = [Point::new(4.89, 52.37), Point::new(4.90, 52.38)];
        let summary = discover_at_points(
            &mut store,
            "ams",
            "1011",
            &points,
            &provider,
            Duration::ZERO,
        )
        .unwrap();

        // The second point re-discovers the same two panoramas.
        assert_eq!(summary.points_queried, 2);
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.duplicates_ignored, 2);
        assert_eq!(store.len("ams"), 2);
    }

    #[test]
    fn test_provider_error_aborts_but_keeps_stored_records() {
        struct FailingProvider {
            calls: std::cell::Cell<usize>,
        }

        impl PanoProvider for FailingProvider {
            fn panoramas_at(&self, _point: &Point) -> Result<Vec<ProviderPanorama>> {
                let call = self.calls.get();
                self.calls.set(call + 1);
                if call == 0 {
                    Ok(vec![pano("a", Some(2014), Some(6))])
                } else {
                    Err(PanostatError::Provider("boom".into()))
                }
            }
        }

        let mut store = MemoryStore::new();
        let provider = FailingProvider {
            calls: std::cell::Cell::new(0),
        };
        let points = [Point::new(4.89, 52.37), Point::new(4.90, 52.38)];

        let result = discover_at_points(
            &mut store,
            "ams",
            "1011",
            &points,
            &provider,
            Duration::ZERO,
        );

        assert!(result.is_err());
        assert_eq!(store.len("ams"), 1);
    }
}
