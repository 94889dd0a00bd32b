//! Time-window filtering of waypoints and tracks.
//!
//! Given the raw point data for a data source — discrete waypoints plus
//! tracks (ordered paths sharing one start time) — and a [`FilterSpec`],
//! produce the flat waypoint list to display: either everything, or only
//! what falls inside a trailing window ending at the most recent timestamp
//! seen anywhere in the input.
//!
//! The filter is pure and performs no I/O. The [`WaypointSource`] seam lets
//! callers combine fetching and filtering in one step while keeping supplier
//! failures visible.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{GeoDataError, Result};
use crate::{Track, Waypoint};

/// Seconds in one day, the granularity of the filter window.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Selection criteria for which waypoints to display.
///
/// When `show_all` is set the other fields are ignored. Otherwise
/// `most_recent_days` defines a trailing window ending at the latest
/// timestamp found across waypoints and track start times, and
/// `include_undated` decides whether records without any time data are shown
/// alongside the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub show_all: bool,
    pub most_recent_days: u32,
    pub include_undated: bool,
}

impl FilterSpec {
    /// Show every waypoint and every track, dated or not.
    pub fn all() -> Self {
        Self {
            show_all: true,
            most_recent_days: 0,
            include_undated: true,
        }
    }

    /// Show only records from the most recent `days` days.
    pub fn most_recent(days: u32, include_undated: bool) -> Self {
        Self {
            show_all: false,
            most_recent_days: days,
            include_undated,
        }
    }
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self::all()
    }
}

/// Supplies raw waypoint and track data for one data source.
///
/// Implemented by the surrounding application over whatever storage it uses.
/// Failures surface as [`GeoDataError::Upstream`] and are propagated to the
/// caller unmodified by [`fetch_filtered`].
pub trait WaypointSource {
    /// All discrete waypoints for the data source.
    fn waypoints(&self) -> Result<Vec<Waypoint>>;

    /// All tracks for the data source.
    fn tracks(&self) -> Result<Vec<Track>>;
}

/// Filter waypoints and tracks down to the list to display.
///
/// In windowed mode the window is `[end - days * 86_400, end]` with both
/// bounds inclusive, where `end` is the latest timestamp among all waypoints
/// and track start times. A track is included or excluded as a unit based
/// solely on its start time. If no record anywhere carries a timestamp, only
/// undated records (when `include_undated` is set) are returned.
///
/// The output is the concatenation of qualifying standalone waypoints and
/// the waypoints of qualifying tracks, in input order, with **no
/// deduplication**: a point that qualifies standalone and inside a
/// qualifying track appears twice. Callers that need unique output must
/// post-process.
///
/// # Errors
///
/// `most_recent_days == 0` in windowed mode is a caller error and returns
/// [`GeoDataError::InvalidFilterWindow`]. Empty input is not an error.
pub fn filter_waypoints(
    waypoints: &[Waypoint],
    tracks: &[Track],
    spec: &FilterSpec,
) -> Result<Vec<Waypoint>> {
    if spec.show_all {
        let mut all = waypoints.to_vec();
        for track in tracks {
            all.extend(track.waypoints.iter().cloned());
        }
        return Ok(all);
    }

    if spec.most_recent_days == 0 {
        return Err(GeoDataError::InvalidFilterWindow {
            days: spec.most_recent_days,
        });
    }

    let latest_waypoint = waypoints.iter().filter_map(|w| w.timestamp).max();
    let latest_track = tracks.iter().filter_map(|t| t.start_time).max();
    let window_end = match (latest_waypoint, latest_track) {
        (Some(w), Some(t)) => Some(w.max(t)),
        (end, None) => end,
        (None, end) => end,
    };

    let mut selected = Vec::new();
    match window_end {
        None => {
            // Nothing anywhere carries a timestamp, so no window exists.
            warn!("no timestamped waypoints or tracks; window filter selects undated records only");
            if spec.include_undated {
                selected.extend(waypoints.iter().cloned());
                for track in tracks {
                    selected.extend(track.waypoints.iter().cloned());
                }
            }
        }
        Some(end) => {
            let start = end - i64::from(spec.most_recent_days) * SECONDS_PER_DAY;
            debug!(
                "window filter [{start}, {end}] over {} waypoints, {} tracks",
                waypoints.len(),
                tracks.len()
            );

            for waypoint in waypoints {
                match waypoint.timestamp {
                    Some(ts) if ts >= start && ts <= end => selected.push(waypoint.clone()),
                    None if spec.include_undated => selected.push(waypoint.clone()),
                    _ => {}
                }
            }
            for track in tracks {
                let qualifies = match track.start_time {
                    Some(ts) => ts >= start && ts <= end,
                    None => spec.include_undated,
                };
                if qualifies {
                    selected.extend(track.waypoints.iter().cloned());
                }
            }
        }
    }

    Ok(selected)
}

/// Fetch raw data from a [`WaypointSource`] and filter it in one step.
///
/// Supplier failures propagate unmodified; the filter itself performs no
/// I/O.
pub fn fetch_filtered<S: WaypointSource>(source: &S, spec: &FilterSpec) -> Result<Vec<Waypoint>> {
    let waypoints = source.waypoints()?;
    let tracks = source.tracks()?;
    let selected = filter_waypoints(&waypoints, &tracks, spec)?;
    debug!(
        "selected {} of {} waypoints across {} tracks",
        selected.len(),
        waypoints.len() + tracks.iter().map(|t| t.waypoints.len()).sum::<usize>(),
        tracks.len()
    );
    Ok(selected)
}
