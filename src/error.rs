//! Error types for panostat.
//!
//! All fallible operations in this crate return [`Result<T>`], and collaborator
//! library failures (HTTP, snapshot codec, GeoJSON parsing) are translated into
//! this vocabulary at the boundary rather than leaking foreign error types.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, PanostatError>;

/// Error type for all panostat operations.
#[derive(Error, Debug)]
pub enum PanostatError {
    /// The interval calculator was handed an empty timestamp sequence.
    #[error("cannot compute interval statistics over an empty timestamp sequence")]
    EmptyTimestamps,

    /// The checked grouper found records out of (x, y) order.
    #[error("records are not sorted by location (first violation at index {index})")]
    UnsortedRecords { index: usize },

    /// A capture date string could not be parsed as year-month.
    #[error("invalid capture date '{0}' (expected YYYY-MM)")]
    InvalidCaptureDate(String),

    /// A region name failed validation.
    #[error("invalid region name: {0}")]
    InvalidRegion(String),

    /// Generic input validation failure.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A record expected to exist was not present in the store.
    #[error("no record for pano '{pano_id}' in subregion '{subregion}' of region '{region}'")]
    UnknownRecord {
        region: String,
        pano_id: String,
        subregion: String,
    },

    /// Filesystem failure from an adapter.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write failure from the export adapter.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Snapshot encode/decode failure.
    #[cfg(feature = "snapshot")]
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// GeoJSON parse or structure failure.
    #[cfg(feature = "geojson")]
    #[error("GeoJSON error: {0}")]
    GeoJson(String),

    /// Imagery metadata provider failure (transport or payload).
    #[cfg(feature = "discover")]
    #[error("provider error: {0}")]
    Provider(String),

    /// Catch-all for everything else.
    #[error("{0}")]
    Other(String),
}
