//! Shared test tracks.

use crate::config::PlannerConfig;
use crate::map::{Waypoint, WaypointMap};
use crate::math::{heading_vector, Point2d};
use std::f64::consts::PI;

/// The radius of the centre line of [circular_track], in m.
pub const TRACK_RADIUS: f64 = 500.0;

/// The number of waypoints on [circular_track].
pub const TRACK_WAYPOINTS: usize = 720;

/// An anticlockwise circular track around the default track centre,
/// with a config whose `max_s` matches it.
pub fn circular_track() -> (PlannerConfig, WaypointMap) {
    let mut config = PlannerConfig::default();
    let chord = 2.0 * TRACK_RADIUS * (PI / TRACK_WAYPOINTS as f64).sin();
    config.max_s = chord * TRACK_WAYPOINTS as f64;

    let centre = config.track_centre();
    let waypoints = (0..TRACK_WAYPOINTS)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / TRACK_WAYPOINTS as f64;
            let normal = heading_vector(angle);
            let pos: Point2d = centre + normal * TRACK_RADIUS;
            Waypoint::new(pos.x, pos.y, chord * i as f64, normal.x, normal.y)
        })
        .collect();

    let map = WaypointMap::new(waypoints, &config).expect("valid test track");
    (config, map)
}

/// The heading, in radians, of a vehicle driving along [circular_track] at `s`.
pub fn track_heading(config: &PlannerConfig, s: f64) -> f64 {
    2.0 * PI * s / config.max_s + PI / 2.0
}
