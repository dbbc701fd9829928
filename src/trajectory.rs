//! Generation of smooth trajectories that continue the path already being driven.

use crate::config::PlannerConfig;
use crate::map::WaypointMap;
use crate::math::{
    heading_of, heading_vector, project_local, rot90, unproject_local, Point2d, Spline,
    SplineError, Vector2d,
};
use crate::vehicle::VehiclePose;
use arrayvec::ArrayVec;
use cgmath::prelude::*;

/// The number of previous path points kept at the start of every trajectory.
pub const ANCHOR_POINTS: usize = 2;

/// The number of anchors placed ahead of the vehicle along the road.
const FORWARD_ANCHORS: usize = 3;

/// Anchors closer together than this along the local x-axis are merged, in m.
const MIN_ANCHOR_SPACING: f64 = 1e-6;

/// A sequence of world space points to be visited one per time step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trajectory {
    points: Vec<Point2d>,
}

/// Inputs into [TrajectoryGenerator::generate].
pub struct PathRequest<'a> {
    /// The points of the last trajectory that the vehicle has not yet reached.
    pub previous_path: &'a [Point2d],
    /// The vehicle's current state.
    pub pose: &'a VehiclePose,
    /// The lane to drive towards.
    pub lane: usize,
    /// The speed to drive at, in mph.
    pub reference_velocity: f64,
}

/// Fits a spline from the end of the previous path into the centre of a lane and samples it.
pub struct TrajectoryGenerator<'a> {
    map: &'a WaypointMap,
    config: &'a PlannerConfig,
}

impl Trajectory {
    /// Creates a trajectory from its points.
    pub fn new(points: Vec<Point2d>) -> Self {
        Self { points }
    }

    /// The points of the trajectory.
    pub fn points(&self) -> &[Point2d] {
        &self.points
    }

    /// The number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether there are no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The x-coordinates of the points.
    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    /// The y-coordinates of the points.
    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }

    /// The final point.
    pub fn end(&self) -> Option<Point2d> {
        self.points.last().copied()
    }

    /// The heading, in radians, of the final step of the trajectory,
    /// or `None` if the last two points coincide.
    pub fn end_heading(&self) -> Option<f64> {
        match self.points.as_slice() {
            [.., a, b] if (*b - *a).magnitude2() > 0.0 => Some(heading_of(*b - *a)),
            _ => None,
        }
    }
}

impl<'a> TrajectoryGenerator<'a> {
    pub fn new(map: &'a WaypointMap, config: &'a PlannerConfig) -> Self {
        Self { map, config }
    }

    /// Generates a trajectory of exactly `steps_count` points.
    ///
    /// The first `min(previous_path.len(), 2)` points are copied from the previous path;
    /// the rest follow a spline into the centre of `lane`, spaced so that the vehicle
    /// travels at `reference_velocity`.
    pub fn generate(&self, request: &PathRequest) -> Result<Trajectory, SplineError> {
        let config = self.config;
        let kept = &request.previous_path[..request.previous_path.len().min(ANCHOR_POINTS)];

        let (reference, heading, behind) = self.reference_frame(kept, request.pose);
        let x_axis = heading_vector(heading);
        let y_axis = rot90(x_axis);

        // Anchors in the local frame of the reference point
        let lane_d = config.lane_centre(request.lane);
        let mut anchors = ArrayVec::<Point2d, { 2 + FORWARD_ANCHORS }>::new();
        anchors.push(behind);
        anchors.push(reference);
        for i in 1..=FORWARD_ANCHORS {
            let s = request.pose.road.s + config.meters_ahead * i as f64;
            anchors.push(self.map.to_cartesian(s, lane_d));
        }
        for anchor in anchors.iter_mut() {
            *anchor = project_local(*anchor, reference, x_axis, y_axis);
        }
        anchors.sort_by(|a, b| a.x.total_cmp(&b.x));

        let mut xs = ArrayVec::<f64, { 2 + FORWARD_ANCHORS }>::new();
        let mut ys = ArrayVec::<f64, { 2 + FORWARD_ANCHORS }>::new();
        for anchor in &anchors {
            if xs.last().map_or(true, |x| anchor.x - x > MIN_ANCHOR_SPACING) {
                xs.push(anchor.x);
                ys.push(anchor.y);
            }
        }
        let spline = Spline::fit(&xs, &ys)?;

        // Space the samples so that each step covers the distance travelled in one time step
        let target = Vector2d::new(config.target_x, spline.y(config.target_x));
        let step_dist = config.step_distance_per_mph() * request.reference_velocity.max(0.0);
        let x_step = config.target_x * step_dist / target.magnitude();

        let mut points = Vec::with_capacity(config.steps_count);
        points.extend_from_slice(kept);
        for i in 1..=config.steps_count.saturating_sub(kept.len()) {
            let x = x_step * i as f64;
            let local = Point2d::new(x, spline.y(x));
            points.push(unproject_local(local, reference, x_axis, y_axis));
        }

        Ok(Trajectory::new(points))
    }

    /// Chooses the origin and heading of the local frame, plus an anchor behind the origin.
    ///
    /// The frame follows the last two kept points of the previous path when there are
    /// two distinct ones, and the vehicle's own pose otherwise.
    fn reference_frame(&self, kept: &[Point2d], pose: &VehiclePose) -> (Point2d, f64, Point2d) {
        let (reference, heading) = match kept {
            [behind, reference] if (*reference - *behind).magnitude2() > 0.0 => {
                return (*reference, heading_of(*reference - *behind), *behind);
            }
            [_, reference] => (*reference, pose.heading()),
            _ => (pose.pos, pose.heading()),
        };
        (reference, heading, reference - heading_vector(heading))
    }
}
