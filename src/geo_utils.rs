//! Geographic computation utilities.
//!
//! Distance math shared by the spatial index and the data model:
//! - [`haversine_distance`] — great-circle distance between two points
//! - [`polyline_length`] — total length of an ordered path
//! - [`distance_to_parallel`] / [`distance_to_meridian`] — separation from a
//!   point to an axis-aligned boundary, used to prune k-d tree subtrees
//!
//! All functions expect WGS84 coordinates (degrees) and return meters,
//! assuming a spherical Earth of radius 6 371 km.

use crate::{GeoPoint, GeoRecord};

/// Mean Earth radius in meters used by all distance calculations.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Calculate the great-circle distance between two points using the
/// haversine formula.
///
/// Identical points return 0.0 without entering the trigonometric path, so
/// exact self-distance holds at the poles and the antimeridian as well.
///
/// # Example
///
/// ```rust
/// use waymark::GeoPoint;
/// use waymark::geo_utils::haversine_distance;
///
/// let london = GeoPoint::new(51.5074, -0.1278);
/// let paris = GeoPoint::new(48.8566, 2.3522);
/// let dist = haversine_distance(&london, &paris);
/// assert!((dist - 343_560.0).abs() < 1000.0); // ~344 km
/// ```
#[inline]
pub fn haversine_distance(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    if p1 == p2 {
        return 0.0;
    }

    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let delta_lat = (p2.latitude - p1.latitude).to_radians();
    let delta_lng = (p2.longitude - p1.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Calculate the total length of an ordered path in meters.
///
/// Sums the haversine distance between consecutive records. Empty or
/// single-point paths return 0.0.
pub fn polyline_length<P: GeoRecord>(points: &[P]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_distance(w[0].position(), w[1].position()))
        .sum()
}

/// Great-circle distance from a point to the parallel at `latitude`.
///
/// A point strictly on the far side of that parallel can never be closer to
/// `point` than this, which is what makes it a safe pruning bound for the
/// latitude splitting axis.
#[inline]
pub fn distance_to_parallel(point: &GeoPoint, latitude: f64) -> f64 {
    (point.latitude - latitude).to_radians().abs() * EARTH_RADIUS_METERS
}

/// Great-circle distance from a point to the meridian at `longitude`.
///
/// Computed as the cross-track distance to the meridian's great circle,
/// `R * asin(cos(lat) * |sin(delta_lng)|)`. Any path from `point` to a point
/// beyond that meridian crosses the meridian's great circle (at the pole if
/// nowhere else), so this is a safe pruning bound for the longitude
/// splitting axis — including near the poles, where a degree of longitude
/// shrinks to nothing.
#[inline]
pub fn distance_to_meridian(point: &GeoPoint, longitude: f64) -> f64 {
    let delta_lng = (point.longitude - longitude).to_radians();
    let cross = point.latitude.to_radians().cos() * delta_lng.sin().abs();
    EARTH_RADIUS_METERS * cross.asin()
}
