//! # Waymark
//!
//! Spatial indexing and time-window filtering for GPS waypoint collections.
//!
//! This library provides:
//! - A balanced k-d tree over geographic points with k-nearest-neighbor
//!   search under great-circle (haversine) distance
//! - Time-window filtering and merging of discrete waypoints and tracks
//! - Geographic distance utilities (haversine, polyline length)
//!
//! The library is the algorithmic core of a geolocation review tool: an
//! external data layer supplies timestamped waypoints and tracks, the filter
//! reduces them to the set that should be displayed, and the index answers
//! proximity queries ("which recorded point is closest to here?") against
//! that set. Rendering, storage and fetching stay outside this crate.
//!
//! ## Quick Start
//!
//! ```rust
//! use waymark::{FilterSpec, GeoPoint, KdTree, Track, Waypoint, filter_waypoints};
//!
//! let waypoints = vec![
//!     Waypoint::new(51.5074, -0.1278, Some(1_700_000_000), 101), // London
//!     Waypoint::new(48.8566, 2.3522, Some(1_700_086_400), 102),  // Paris
//!     Waypoint::new(40.7128, -74.0060, None, 103),               // undated
//! ];
//! let tracks: Vec<Track> = Vec::new();
//!
//! // Keep everything recorded in the last 30 days, drop undated points.
//! let spec = FilterSpec::most_recent(30, false);
//! let shown = filter_waypoints(&waypoints, &tracks, &spec).unwrap();
//! assert_eq!(shown.len(), 2);
//!
//! // Index the filtered set and find the point closest to central London.
//! let index = KdTree::from_points(shown);
//! let target = GeoPoint::new(51.5080, -0.1300);
//! let nearest = index.nearest_neighbors(1, &target);
//! assert_eq!(nearest[0].source_id, 101);
//! ```

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{GeoDataError, Result};

// Geographic utilities (distance, path length, axis separations)
pub mod geo_utils;

// k-d tree spatial index
pub mod kdtree;
pub use kdtree::KdTree;

// Time-window filtering of waypoints and tracks
pub mod filter;
pub use filter::{fetch_filtered, filter_waypoints, FilterSpec, WaypointSource};

// ============================================================================
// Core Types
// ============================================================================

/// A geographic coordinate with latitude, longitude and elevation.
///
/// Elevation is carried for completeness but is 0.0 for every point produced
/// by the supported data sources; the index splits on latitude and longitude
/// only.
///
/// Equality is exact floating-point equality of all three components, and
/// [`cmp_coords`](GeoPoint::cmp_coords) orders points lexicographically —
/// both are for deterministic identity and tie-breaking, never proximity.
///
/// # Example
/// ```
/// use waymark::GeoPoint;
/// let point = GeoPoint::new(51.5074, -0.1278); // London
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub elevation: f64,
}

impl GeoPoint {
    /// Create a new point at elevation 0.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation: 0.0,
        }
    }

    /// Create a new point with an explicit elevation in meters.
    pub fn with_elevation(latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation,
        }
    }

    /// Check that the coordinates are finite and within range.
    ///
    /// The index rejects records that fail this check; source databases can
    /// contain artifacts without usable coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.elevation.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// Lexicographic comparison by latitude, then longitude, then elevation.
    ///
    /// Deterministic total order used for tie-breaking in the index; it says
    /// nothing about which point is nearer to anything.
    pub fn cmp_coords(&self, other: &GeoPoint) -> Ordering {
        self.latitude
            .total_cmp(&other.latitude)
            .then_with(|| self.longitude.total_cmp(&other.longitude))
            .then_with(|| self.elevation.total_cmp(&other.elevation))
    }

    /// Coordinate value for a splitting axis (0 = latitude, 1 = longitude,
    /// 2 = elevation).
    pub(crate) fn axis_value(&self, axis: usize) -> f64 {
        match axis {
            0 => self.latitude,
            1 => self.longitude,
            _ => self.elevation,
        }
    }
}

/// Anything that carries a geographic position.
///
/// The seam between the data model and the spatial algorithms: the index and
/// the geo utilities accept bare [`GeoPoint`]s or richer records such as
/// [`Waypoint`] through this trait.
pub trait GeoRecord {
    /// The position of this record.
    fn position(&self) -> &GeoPoint;
}

impl GeoRecord for GeoPoint {
    fn position(&self) -> &GeoPoint {
        self
    }
}

/// Bounding box for a set of geographic records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds covering all of the given records.
    ///
    /// Returns `None` for empty input.
    pub fn from_points<P: GeoRecord>(points: &[P]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for p in points {
            let pos = p.position();
            min_lat = min_lat.min(pos.latitude);
            max_lat = max_lat.max(pos.latitude);
            min_lng = min_lng.min(pos.longitude);
            max_lng = max_lng.max(pos.longitude);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// A timestamped geographic point extracted from a source record.
///
/// `timestamp` is seconds since the Unix epoch; `None` means the source
/// record carries no time data. `source_id` identifies the originating
/// record and is opaque to this library; callers use it to navigate back to
/// the record a point came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub position: GeoPoint,
    pub timestamp: Option<i64>,
    pub source_id: i64,
}

impl Waypoint {
    /// Create a new waypoint.
    pub fn new(latitude: f64, longitude: f64, timestamp: Option<i64>, source_id: i64) -> Self {
        Self {
            position: GeoPoint::new(latitude, longitude),
            timestamp,
            source_id,
        }
    }

    /// Create a new waypoint at an existing position.
    pub fn at(position: GeoPoint, timestamp: Option<i64>, source_id: i64) -> Self {
        Self {
            position,
            timestamp,
            source_id,
        }
    }
}

impl GeoRecord for Waypoint {
    fn position(&self) -> &GeoPoint {
        &self.position
    }
}

/// An ordered path of waypoints sharing a single start time.
///
/// A track is included in or excluded from a time window as a unit, based
/// solely on `start_time`; the timestamps of its member waypoints are not
/// consulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    /// Seconds since the Unix epoch; `None` means the track is undated.
    pub start_time: Option<i64>,
    pub waypoints: Vec<Waypoint>,
}

impl Track {
    /// Create a new track.
    pub fn new(name: impl Into<String>, start_time: Option<i64>, waypoints: Vec<Waypoint>) -> Self {
        Self {
            name: name.into(),
            start_time,
            waypoints,
        }
    }

    /// Total path length in meters.
    pub fn distance(&self) -> f64 {
        geo_utils::polyline_length(&self.waypoints)
    }

    /// Bounding box of the track, `None` if it has no waypoints.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.waypoints)
    }
}
