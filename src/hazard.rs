//! Detection of vehicles that make a lane unsafe to drive in.

use crate::config::PlannerConfig;
use crate::util::wrapped_difference;
use crate::vehicle::SensedVehicle;

/// Inputs into [detect_hazard].
pub struct HazardQuery<'a> {
    /// The vehicles reported by sensor fusion.
    pub vehicles: &'a [SensedVehicle],
    /// The lane to check.
    pub lane: usize,
    /// The lane the vehicle was in at the end of the last cycle.
    pub prev_lane: usize,
    /// The vehicle's current longitudinal position.
    pub start_s: f64,
    /// The longitudinal position at the end of the candidate trajectory.
    pub end_s: f64,
    /// The number of previous path points carried into the trajectory.
    pub prev_size: usize,
    /// Reported as the hazard velocity when no vehicle is found ahead.
    pub reference_velocity: f64,
}

/// The closest threat found in a lane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hazard {
    /// Whether a vehicle is too close for comfort.
    pub is_hazard: bool,
    /// The speed of the closest vehicle ahead, in m/s.
    pub velocity: f64,
    /// The gap to the closest vehicle ahead, in m. Zero when a collision is imminent
    /// and infinite when there is no vehicle ahead.
    pub distance: f64,
}

impl Hazard {
    /// A lane with nobody in it.
    pub fn clear(reference_velocity: f64) -> Self {
        Self {
            is_hazard: false,
            velocity: reference_velocity,
            distance: f64::INFINITY,
        }
    }
}

/// Scans the sensed vehicles in a lane for the closest one ahead of the trajectory's end,
/// flagging the lane if a vehicle is too close, alongside, or closing fast from behind.
///
/// Positions are compared relative to `start_s`, the shortest way round the track.
pub fn detect_hazard(query: &HazardQuery, config: &PlannerConfig) -> Hazard {
    let band = config.lane_band(query.lane);
    let horizon = config.time_step * query.prev_size as f64;
    let margin = config.occupancy_margin;
    let end = wrapped_difference(query.end_s, query.start_s, config.max_s);

    let mut hazard = Hazard::clear(query.reference_velocity);

    for vehicle in query.vehicles {
        if !band.contains_exclusive(vehicle.road.d) {
            continue;
        }

        let first = wrapped_difference(vehicle.road.s, query.start_s, config.max_s);
        let last = wrapped_difference(vehicle.projected_s(horizon), query.start_s, config.max_s);

        let gap = last - end;
        if gap > 0.0 {
            if gap < config.cars_min_distance {
                hazard.is_hazard = true;
            }
            if gap < hazard.distance {
                hazard.distance = gap;
                hazard.velocity = vehicle.speed();
            }
        }

        if first > -margin && last < end + margin {
            // Alongside for the duration of the trajectory
            hazard.is_hazard = true;
            hazard.distance = 0.0;
        } else if query.lane != query.prev_lane && first < -margin && last >= end {
            // Fast vehicle from behind
            hazard.is_hazard = true;
            hazard.distance = 0.0;
        }
    }

    hazard
}
