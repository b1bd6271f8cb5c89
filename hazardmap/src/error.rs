//! Error types.

use thiserror::Error;

/// Reason a feed could not be loaded.
///
/// Callers at the fetcher boundary treat every variant the same way. The
/// distinction only exists for logging.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be sent or the body could not be read.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// The body is not valid GeoJSON.
    #[error("invalid GeoJSON payload: {0}")]
    Decode(#[from] geojson::Error),

    /// The body is valid GeoJSON but not a feature collection.
    #[error("expected a FeatureCollection, got {0}")]
    NotACollection(&'static str),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchError::Status(status.as_u16()),
            None => FetchError::Network(err.to_string()),
        }
    }
}

/// Crate level error.
#[derive(Debug, Error)]
pub enum HazardMapError {
    /// Configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid.
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    /// Configuration values are inconsistent.
    #[error("invalid config value `{field}`: {reason}")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A status or URL template could not be formatted.
    #[error("template error: {0}")]
    Template(String),

    /// HTTP client could not be created.
    #[error("failed to create HTTP client: {0}")]
    Client(String),

    /// Requested tile is outside of the layer zoom range.
    #[error("zoom level {z} is above the layer maximum {max}")]
    ZoomOutOfRange {
        /// Requested zoom.
        z: u32,
        /// Highest zoom the layer serves.
        max: u32,
    },

    /// Loading a feed failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl From<strfmt::FmtError> for HazardMapError {
    fn from(err: strfmt::FmtError) -> Self {
        HazardMapError::Template(err.to_string())
    }
}
