//! Error types for the route workflow.

use thiserror::Error;

/// Failures talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Failures of a single operator action.
///
/// Validation variants are raised before any network call and never leave
/// partial state behind.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("please select an area")]
    NoAreaSelected,

    #[error("fill level threshold must be between 0 and 100, got {0}")]
    InvalidThreshold(u8),

    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("bin {0} is not part of this area")]
    UnknownBin(String),

    #[error("stop position {index} is out of range for a route of {len} stops")]
    StopOutOfRange { index: usize, len: usize },

    #[error("please select a collector")]
    MissingCollector,

    #[error("invalid schedule start: {0}")]
    InvalidStartTime(String),

    #[error("route has no stops")]
    EmptyRoute,

    #[error("a route request is already in flight")]
    RequestPending,

    #[error("no route request is in flight")]
    NoRequestPending,

    #[error(transparent)]
    Backend(#[from] ApiError),
}

impl RouteError {
    /// True for errors caught before any network call.
    pub fn is_validation(&self) -> bool {
        !matches!(self, RouteError::Backend(_))
    }
}
