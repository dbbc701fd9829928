//! The waypoint map and conversions between Cartesian and road coordinates.
//!
//! Road coordinates are `s`, the distance along the road's centre line, and `d`,
//! the lateral offset from it (positive to the right of the direction of travel).
//! The road is modelled as the closed polyline through the waypoints, so both
//! conversions are only approximate on a curved road.

use crate::config::PlannerConfig;
use crate::math::{heading_difference, heading_of, heading_vector, rot90, Point2d, Vector2d};
use crate::util::wrap_position;
use cgmath::prelude::*;
use std::f64::consts::FRAC_PI_4;
use thiserror::Error;

pub use loader::MapLoadError;

mod loader;

/// An error in the contents of a waypoint map.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MapError {
    #[error("the waypoint map needs at least two waypoints, found {0}")]
    Empty(usize),

    #[error("waypoint {index} has a non-finite coordinate")]
    NonFinite { index: usize },

    #[error("waypoint s values must increase, but waypoint {index} has s = {s}")]
    NonIncreasing { index: usize, s: f64 },

    #[error("the track length {max_s} must exceed the last waypoint's s = {last_s}")]
    TrackTooShort { max_s: f64, last_s: f64 },
}

/// A sampled point on the road's centre line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Waypoint {
    /// The world space position.
    pub pos: Point2d,
    /// The distance along the road from the first waypoint, in m.
    pub s: f64,
    /// Unit vector perpendicular to the road, pointing towards positive `d`.
    pub normal: Vector2d,
}

/// A position in road coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RoadPosition {
    /// The longitudinal position along the centre line in m, in `[0, max_s)`.
    pub s: f64,
    /// The lateral offset from the centre line in m.
    pub d: f64,
}

/// An ordered map of the waypoints around a closed track.
#[derive(Clone, Debug)]
pub struct WaypointMap {
    waypoints: Vec<Waypoint>,
    /// Straight-line distance from the first waypoint to each waypoint, along the polyline.
    chord_s: Vec<f64>,
    /// The length of the track.
    max_s: f64,
    /// A point inside the loop, used to decide the sign of `d`.
    centre: Point2d,
}

impl Waypoint {
    /// Creates a waypoint from a row of the waypoint table.
    pub fn new(x: f64, y: f64, s: f64, dx: f64, dy: f64) -> Self {
        Self {
            pos: Point2d::new(x, y),
            s,
            normal: Vector2d::new(dx, dy),
        }
    }
}

impl WaypointMap {
    /// Creates a waypoint map, taking the track length and centre from the config.
    pub fn new(waypoints: Vec<Waypoint>, config: &PlannerConfig) -> Result<Self, MapError> {
        if waypoints.len() < 2 {
            return Err(MapError::Empty(waypoints.len()));
        }
        for (index, wp) in waypoints.iter().enumerate() {
            let coords = [wp.pos.x, wp.pos.y, wp.s, wp.normal.x, wp.normal.y];
            if !coords.iter().all(|c| c.is_finite()) {
                return Err(MapError::NonFinite { index });
            }
        }
        for (index, pair) in waypoints.windows(2).enumerate() {
            if pair[1].s <= pair[0].s {
                return Err(MapError::NonIncreasing {
                    index: index + 1,
                    s: pair[1].s,
                });
            }
        }
        let last_s = waypoints[waypoints.len() - 1].s;
        if config.max_s <= last_s {
            return Err(MapError::TrackTooShort {
                max_s: config.max_s,
                last_s,
            });
        }

        let chord_s = std::iter::once(0.0)
            .chain(waypoints.windows(2).scan(0.0, |acc, pair| {
                *acc += pair[0].pos.distance(pair[1].pos);
                Some(*acc)
            }))
            .collect();

        Ok(Self {
            waypoints,
            chord_s,
            max_s: config.max_s,
            centre: config.track_centre(),
        })
    }

    /// The number of waypoints.
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Always false; a map has at least two waypoints.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// The waypoints, in order along the track.
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// The length of the track.
    pub fn max_s(&self) -> f64 {
        self.max_s
    }

    /// Converts a world space position and heading (in radians) into road coordinates.
    pub fn to_road_frame(&self, point: Point2d, heading: f64) -> RoadPosition {
        let count = self.waypoints.len();
        let next = self.next_waypoint(point, heading);
        let prev = (next + count - 1) % count;

        let start = self.waypoints[prev].pos;
        let segment = self.waypoints[next].pos - start;
        let offset = point - start;

        // Project the point onto the segment
        let along = offset.dot(segment) / segment.magnitude2();
        let proj = segment * along;

        // The sign of `d` depends on which side of the centre line is nearer the track centre
        let centre = self.centre - start;
        let mut d = (offset - proj).magnitude();
        if (centre - offset).magnitude() <= (centre - proj).magnitude() {
            d = -d;
        }

        let s = self.chord_s[prev] + along * segment.magnitude();
        RoadPosition {
            s: wrap_position(s, self.max_s),
            d,
        }
    }

    /// Converts road coordinates into a world space position.
    ///
    /// `s` is wrapped onto the track, so any finite value is accepted.
    pub fn to_cartesian(&self, s: f64, d: f64) -> Point2d {
        let count = self.waypoints.len();
        let s = wrap_position(s, self.max_s);

        // Positions before the first waypoint lie on the segment that closes the loop
        let (prev, seg_s) = match self.waypoints.partition_point(|wp| wp.s <= s) {
            0 => (count - 1, s + self.max_s - self.waypoints[count - 1].s),
            idx => (idx - 1, s - self.waypoints[idx - 1].s),
        };
        let next = (prev + 1) % count;

        let start = self.waypoints[prev].pos;
        let dir = heading_vector(heading_of(self.waypoints[next].pos - start));
        let right = -rot90(dir);

        start + dir * seg_s + right * d
    }

    /// The index of the waypoint nearest to the point. Ties go to the lowest index.
    pub fn closest_waypoint(&self, point: Point2d) -> usize {
        let mut closest = (0, f64::INFINITY);
        for (idx, wp) in self.waypoints.iter().enumerate() {
            let dist = wp.pos.distance2(point);
            if dist < closest.1 {
                closest = (idx, dist);
            }
        }
        closest.0
    }

    /// The index of the next waypoint ahead of a point travelling with the given heading.
    pub fn next_waypoint(&self, point: Point2d, heading: f64) -> usize {
        let closest = self.closest_waypoint(point);
        let bearing = heading_of(self.waypoints[closest].pos - point);
        if heading_difference(heading, bearing) > FRAC_PI_4 {
            (closest + 1) % self.waypoints.len()
        } else {
            closest
        }
    }
}
