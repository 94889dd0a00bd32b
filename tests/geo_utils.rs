//! Tests for the geo_utils module.

use waymark::geo_utils::{
    distance_to_meridian, distance_to_parallel, haversine_distance, polyline_length,
    EARTH_RADIUS_METERS,
};
use waymark::{GeoPoint, Track, Waypoint};

/// Meters spanned by one degree of arc on the reference sphere.
const METERS_PER_DEGREE: f64 = EARTH_RADIUS_METERS * std::f64::consts::PI / 180.0;

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

#[test]
fn test_haversine_distance_same_point() {
    let p = GeoPoint::new(51.5074, -0.1278);
    assert_eq!(haversine_distance(&p, &p), 0.0);
}

#[test]
fn test_haversine_distance_zero_at_poles_and_antimeridian() {
    // The identical-point short-circuit must hold where the trigonometric
    // path is least stable.
    let north_pole = GeoPoint::new(90.0, 45.0);
    let south_pole = GeoPoint::new(-90.0, -120.0);
    let antimeridian = GeoPoint::new(0.0, 180.0);

    assert_eq!(haversine_distance(&north_pole, &north_pole), 0.0);
    assert_eq!(haversine_distance(&south_pole, &south_pole), 0.0);
    assert_eq!(haversine_distance(&antimeridian, &antimeridian), 0.0);
}

#[test]
fn test_haversine_distance_known_value() {
    // London to Paris is approximately 344 km
    let london = GeoPoint::new(51.5074, -0.1278);
    let paris = GeoPoint::new(48.8566, 2.3522);
    let dist = haversine_distance(&london, &paris);
    assert!(approx_eq(dist, 343_560.0, 5000.0)); // Within 5km
}

#[test]
fn test_haversine_distance_one_degree_arcs() {
    // One degree of latitude anywhere, and one degree of longitude at the
    // equator, both span the same arc.
    let lat_arc = haversine_distance(&GeoPoint::new(10.0, 20.0), &GeoPoint::new(11.0, 20.0));
    let lng_arc = haversine_distance(&GeoPoint::new(0.0, 20.0), &GeoPoint::new(0.0, 21.0));

    assert!(approx_eq(lat_arc, METERS_PER_DEGREE, 1.0));
    assert!(approx_eq(lng_arc, METERS_PER_DEGREE, 1.0));
}

#[test]
fn test_polyline_length_empty_and_single() {
    let empty: Vec<GeoPoint> = vec![];
    assert_eq!(polyline_length(&empty), 0.0);

    let single = vec![GeoPoint::new(51.5074, -0.1278)];
    assert_eq!(polyline_length(&single), 0.0);
}

#[test]
fn test_polyline_length_sums_segments() {
    let path = vec![
        GeoPoint::new(51.5074, -0.1278),
        GeoPoint::new(51.5080, -0.1280),
        GeoPoint::new(51.5090, -0.1290),
    ];
    let first = haversine_distance(&path[0], &path[1]);
    let second = haversine_distance(&path[1], &path[2]);
    assert!(approx_eq(polyline_length(&path), first + second, 1e-9));
}

#[test]
fn test_track_distance_matches_polyline_length() {
    let waypoints = vec![
        Waypoint::new(51.5074, -0.1278, Some(0), 1),
        Waypoint::new(51.5080, -0.1280, Some(10), 2),
        Waypoint::new(51.5090, -0.1290, Some(20), 3),
    ];
    let track = Track::new("stroll", Some(0), waypoints.clone());
    assert_eq!(track.distance(), polyline_length(&waypoints));
}

#[test]
fn test_distance_to_parallel() {
    let p = GeoPoint::new(10.0, 20.0);
    assert!(approx_eq(distance_to_parallel(&p, 11.0), METERS_PER_DEGREE, 1.0));
    assert_eq!(distance_to_parallel(&p, 10.0), 0.0);
    // Independent of longitude.
    let q = GeoPoint::new(10.0, -170.0);
    assert_eq!(distance_to_parallel(&p, 25.0), distance_to_parallel(&q, 25.0));
}

#[test]
fn test_distance_to_meridian() {
    // At the equator a degree of longitude spans a full degree of arc.
    let equator = GeoPoint::new(0.0, 0.0);
    assert!(approx_eq(
        distance_to_meridian(&equator, 1.0),
        METERS_PER_DEGREE,
        1.0
    ));

    // At 60°N the separation shrinks with cos(latitude).
    let north = GeoPoint::new(60.0, 0.0);
    let shrunk = distance_to_meridian(&north, 1.0);
    assert!(shrunk < 0.51 * METERS_PER_DEGREE);
    assert!(shrunk > 0.49 * METERS_PER_DEGREE);

    // At the pole every meridian passes through the point.
    let pole = GeoPoint::new(90.0, 0.0);
    assert!(distance_to_meridian(&pole, 123.0).abs() < 1e-6);
}
