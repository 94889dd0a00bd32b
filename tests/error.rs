//! Tests for the error module.

use std::io;

use waymark::GeoDataError;

#[test]
fn test_invalid_window_display() {
    let err = GeoDataError::InvalidFilterWindow { days: 0 };
    assert!(err.to_string().contains("most_recent_days = 0"));
}

#[test]
fn test_upstream_carries_the_original_error() {
    let err = GeoDataError::upstream(io::Error::new(io::ErrorKind::Other, "connection reset"));
    assert!(err.to_string().contains("connection reset"));
    assert!(matches!(err, GeoDataError::Upstream(_)));
}
