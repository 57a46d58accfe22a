//! Embedded store and statistics engine for street-level panorama capture
//! metadata: discover panoramas over polygon regions, group them by location,
//! and derive temporal-coverage statistics per location or per polygon.
//!
//! ```rust
//! use panostat::{CaptureDate, CoordinateSource, MemoryStore, PanoramaRecord, RecordStore};
//! use panostat::grouping::group_by_location;
//! use panostat::stats::assemble_stats;
//!
//! let mut store = MemoryStore::new();
//! store.insert("ams", PanoramaRecord::new(
//!     "1011",
//!     "pano-a",
//!     CaptureDate::new(2010, 1)?,
//!     (4.89, 52.37),
//!     (4.8901, 52.3702),
//! ))?;
//!
//! let records = store.records("ams")?;
//! let groups = group_by_location(&records, CoordinateSource::Pano, Some(6));
//! let rows = assemble_stats(&groups, CoordinateSource::Pano)?;
//! assert_eq!(rows.len(), 1);
//! # Ok::<(), panostat::PanostatError>(())
//! ```

pub mod aggregate;
pub mod error;
pub mod export;
pub mod grouping;
pub mod spatial;
pub mod stats;
pub mod store;
pub mod temporal;
pub mod types;

#[cfg(feature = "discover")]
pub mod discover;

#[cfg(feature = "geojson")]
pub mod geojson_io;

#[cfg(feature = "snapshot")]
pub mod persistence;

pub use error::{PanostatError, Result};

pub use types::{CaptureDate, Config, CoordinateSource, PanoramaRecord};

pub use store::{InsertOutcome, MemoryStore, RecordStore, StoreStats};

pub use grouping::{
    LocationGroup, group_by_location, group_by_location_checked, sort_by_location,
};

pub use temporal::{IntervalStats, interval_stats, service_epoch};

pub use stats::{StatRow, assemble_stats};

pub use aggregate::{PolygonStats, polygon_time_stats};

pub use geo::{Point, Polygon, Rect};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{PanostatError, Result};

    pub use crate::{CaptureDate, Config, CoordinateSource, PanoramaRecord};

    pub use crate::{InsertOutcome, MemoryStore, RecordStore};

    pub use crate::{assemble_stats, group_by_location, interval_stats, polygon_time_stats};

    pub use geo::{Point, Polygon, Rect};

    #[cfg(feature = "snapshot")]
    pub use crate::persistence::{load_snapshot, save_snapshot};

    #[cfg(feature = "discover")]
    pub use crate::discover::{HttpPanoProvider, PanoProvider, discover_at_points};
}
