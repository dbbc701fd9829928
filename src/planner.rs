//! The per-cycle lane and velocity controller.

use crate::config::{PlannerConfig, LANE_COUNT};
use crate::cost::lane_cost;
use crate::hazard::{detect_hazard, Hazard, HazardQuery};
use crate::map::{RoadPosition, WaypointMap};
use crate::math::{Point2d, SplineError};
use crate::trajectory::{PathRequest, Trajectory, TrajectoryGenerator, ANCHOR_POINTS};
use crate::util::Interval;
use crate::vehicle::{SensedVehicle, VehiclePose};
use itertools::Itertools;
use log::{debug, trace};
use thiserror::Error;

/// An error that prevents a cycle from producing a trajectory.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlanError {
    #[error("Cannot fit a path through the anchor points: {0}")]
    Spline(#[from] SplineError),

    #[error("Lane {0} does not exist")]
    LaneOutOfRange(usize),
}

/// The planner's memory of its own decisions, carried from one cycle to the next.
///
/// There should be one of these per vehicle being planned for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlannerState {
    /// The lane being driven in or changed into.
    pub lane: usize,
    /// The target cruising speed in mph.
    pub reference_velocity: f64,
}

/// Everything the planner is told about the world in one cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct CycleInput {
    /// The vehicle's current state.
    pub pose: VehiclePose,
    /// The points of the last trajectory the vehicle has not yet reached.
    pub previous_path: Vec<Point2d>,
    /// The road coordinates of the last point of `previous_path`.
    pub end_path: RoadPosition,
    /// The other vehicles on the same side of the road.
    pub sensor_fusion: Vec<SensedVehicle>,
}

/// How desirable a lane is this cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaneEvaluation {
    /// The lane's cost in `[0, 1]`.
    pub cost: f64,
    /// The closest threat in the lane.
    pub hazard: Hazard,
}

/// Chooses a lane and speed each cycle and produces the trajectory to drive.
#[derive(Clone, Debug)]
pub struct Planner {
    map: WaypointMap,
    config: PlannerConfig,
}

impl Default for PlannerState {
    fn default() -> Self {
        Self {
            lane: 1,
            reference_velocity: 0.0,
        }
    }
}

impl Planner {
    /// Creates a new planner.
    pub fn new(map: WaypointMap, config: PlannerConfig) -> Self {
        Self { map, config }
    }

    /// The planner's waypoint map.
    pub fn map(&self) -> &WaypointMap {
        &self.map
    }

    /// The planner's parameters.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Runs one planning cycle, updating `state` with the chosen lane and speed.
    ///
    /// `state` is left untouched if no trajectory can be produced.
    pub fn plan(
        &self,
        state: &mut PlannerState,
        input: &CycleInput,
    ) -> Result<Trajectory, PlanError> {
        if state.lane >= LANE_COUNT {
            return Err(PlanError::LaneOutOfRange(state.lane));
        }

        let mut evaluations = [LaneEvaluation {
            cost: 1.0,
            hazard: Hazard::clear(state.reference_velocity),
        }; LANE_COUNT];
        for (lane, evaluation) in evaluations.iter_mut().enumerate() {
            *evaluation = self.evaluate_lane(state, input, lane)?;
            trace!("Lane {}: {:?}", lane, evaluation);
        }

        let lane = self.choose_lane(state, input.pose.road.d, &evaluations);
        let reference_velocity = self.adjust_velocity(state, lane, &evaluations[lane].hazard);

        let trajectory = self.generator().generate(&PathRequest {
            previous_path: &input.previous_path,
            pose: &input.pose,
            lane,
            reference_velocity,
        })?;

        if lane != state.lane {
            debug!("Changing from lane {} to lane {}", state.lane, lane);
        }
        if reference_velocity != state.reference_velocity {
            debug!(
                "Reference velocity {:.2} -> {:.2} mph",
                state.reference_velocity, reference_velocity
            );
        }
        *state = PlannerState {
            lane,
            reference_velocity,
        };

        Ok(trajectory)
    }

    /// Evaluates the cost of heading for a lane at the current reference velocity.
    pub fn evaluate_lane(
        &self,
        state: &PlannerState,
        input: &CycleInput,
        lane: usize,
    ) -> Result<LaneEvaluation, PlanError> {
        let trajectory = self.generator().generate(&PathRequest {
            previous_path: &input.previous_path,
            pose: &input.pose,
            lane,
            reference_velocity: state.reference_velocity,
        })?;

        // Where the vehicle would be at the end of the trajectory
        let end = trajectory.end().unwrap_or(input.pose.pos);
        let heading = trajectory.end_heading().unwrap_or_else(|| input.pose.heading());
        let end_s = self.map.to_road_frame(end, heading).s;

        let hazard = detect_hazard(
            &HazardQuery {
                vehicles: &input.sensor_fusion,
                lane,
                prev_lane: state.lane,
                start_s: input.pose.road.s,
                end_s,
                prev_size: input.previous_path.len().min(ANCHOR_POINTS),
                reference_velocity: state.reference_velocity,
            },
            &self.config,
        );
        let cost = lane_cost(
            lane,
            hazard.distance,
            hazard.velocity,
            self.config.max_velocity,
            &self.config,
        );

        Ok(LaneEvaluation { cost, hazard })
    }

    /// Picks the cheapest reachable lane, staying put if every lane is blocked.
    fn choose_lane(
        &self,
        state: &PlannerState,
        d: f64,
        evaluations: &[LaneEvaluation; LANE_COUNT],
    ) -> usize {
        let current = state.lane;
        let mut costs = evaluations.map(|e| e.cost);

        // Only adjacent lanes can be reached in one change
        for (lane, cost) in costs.iter_mut().enumerate() {
            if lane.abs_diff(current) > 1 {
                *cost = 1.0;
            }
        }

        // Let a lane change that's under way finish first
        let centred = Interval::disc(
            self.config.lane_centre(current),
            self.config.lane_centre_tolerance,
        );
        if !centred.contains(d) && costs[current] < self.config.hazard_cost_threshold {
            for (lane, cost) in costs.iter_mut().enumerate() {
                if lane != current {
                    *cost = 1.0;
                }
            }
        }

        let best = costs
            .iter()
            .position_min_by(|a, b| a.total_cmp(b))
            .unwrap_or(current);
        if costs[best] >= 1.0 {
            current
        } else {
            best
        }
    }

    /// Slows down behind a hazard, otherwise speeds up towards the ceiling
    /// unless a lane change was just started.
    fn adjust_velocity(&self, state: &PlannerState, lane: usize, hazard: &Hazard) -> f64 {
        let config = &self.config;
        let mut velocity = state.reference_velocity;

        if hazard.is_hazard {
            if velocity > hazard.velocity {
                velocity -= config.velocity_step;
            }
            if hazard.distance < config.very_close_distance {
                velocity -= 2.0 * config.velocity_step;
            }
        } else if lane == state.lane {
            velocity += config.velocity_step;
        }

        velocity.clamp(0.0, config.max_velocity)
    }

    fn generator(&self) -> TrajectoryGenerator<'_> {
        TrajectoryGenerator::new(&self.map, &self.config)
    }
}
