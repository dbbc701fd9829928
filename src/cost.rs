//! The cost of driving in a lane.

use crate::config::PlannerConfig;

/// The lane with the most options for changing lanes later.
pub const CENTRE_LANE: usize = 1;

/// Scores a lane in `[0, 1]`, where 1 means the lane must not be used.
///
/// A lane costs more the closer and slower its lead vehicle is relative to
/// `desired_velocity`. Lanes other than the centre lane carry a fixed penalty.
///
/// # Parameters
/// * `lane` - The lane being scored
/// * `hazard_distance` - The gap to the lead vehicle, zero if a collision is imminent
/// * `hazard_velocity` - The speed of the lead vehicle
/// * `desired_velocity` - The speed the vehicle would like to travel at in this lane
pub fn lane_cost(
    lane: usize,
    hazard_distance: f64,
    hazard_velocity: f64,
    desired_velocity: f64,
    config: &PlannerConfig,
) -> f64 {
    if hazard_distance <= 0.0 {
        return 1.0;
    }

    let mut cost = 0.0;

    let deficit = f64::max(desired_velocity - hazard_velocity, 0.0);
    if hazard_distance < 3.0 * config.cars_min_distance {
        cost += 1.0 - (-deficit / hazard_distance).exp();
    }

    if lane != CENTRE_LANE {
        cost += config.off_centre_penalty;
    }

    f64::min(cost, 1.0)
}
