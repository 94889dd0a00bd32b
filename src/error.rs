//! Unified error handling for waymark.
//!
//! Both algorithms are deterministic and allocation-only, so the error
//! surface is narrow: a misconfigured filter window, or a failure raised by
//! the external record supplier. Absent or invalid *data* (empty trees,
//! out-of-range coordinates) is reported through empty results and boolean
//! returns, not through this type.

use thiserror::Error;

/// Result type alias using [`GeoDataError`].
pub type Result<T> = std::result::Result<T, GeoDataError>;

/// Errors that can occur while filtering or fetching geolocation data.
#[derive(Debug, Error)]
pub enum GeoDataError {
    /// A windowed filter was requested with a window of zero days.
    ///
    /// The window length is a caller-supplied precondition; it is rejected
    /// rather than silently clamped.
    #[error("filter window must cover at least one day (most_recent_days = {days})")]
    InvalidFilterWindow { days: u32 },

    /// The external waypoint/track supplier failed.
    ///
    /// The underlying error is carried as-is; this crate adds no context of
    /// its own.
    #[error("waypoint source failed: {0}")]
    Upstream(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl GeoDataError {
    /// Wrap an arbitrary supplier error as an upstream failure.
    pub fn upstream<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        GeoDataError::Upstream(Box::new(err))
    }
}
