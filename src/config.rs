//! Tunable planner parameters.

use crate::math::Point2d;
use crate::util::Interval;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// The number of lanes on the carriageway, numbered left to right from 0.
pub const LANE_COUNT: usize = 3;

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Cannot load the parameter file: {0}")]
    FileLoadError(#[from] std::io::Error),

    #[error("Cannot read the parameter file: {0}")]
    DeserialiseError(#[from] toml::de::Error),

    #[error("Invalid parameter `{name}`: {reason}")]
    Invalid {
        name: &'static str,
        reason: &'static str,
    },
}

/// The parameters of the planner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// The width of a lane in m.
    pub lane_width: f64,
    /// The longitudinal spacing of the forward curve anchors in m.
    pub meters_ahead: f64,
    /// The local-frame lookahead used to space trajectory samples, in m.
    pub target_x: f64,
    /// The number of points in an emitted trajectory.
    pub steps_count: usize,
    /// The time between consecutive trajectory points in s.
    pub time_step: f64,
    /// Conversion factor from the reference velocity's unit (mph) to m/s.
    pub mph_per_mps: f64,
    /// The minimum safe gap to a vehicle ahead in m.
    pub cars_min_distance: f64,
    /// The reference velocity ceiling in mph.
    pub max_velocity: f64,
    /// The change in reference velocity per cycle in mph.
    pub velocity_step: f64,
    /// Half-width of the window in which another vehicle counts as alongside, in m.
    pub occupancy_margin: f64,
    /// Gaps below this many m trigger additional braking.
    pub very_close_distance: f64,
    /// The cost added to every lane except the centre one.
    pub off_centre_penalty: f64,
    /// How far from its lane centre the vehicle may be before it is considered
    /// to be mid lane change, in m.
    pub lane_centre_tolerance: f64,
    /// A lane change in progress is locked in while the current lane's cost is below this.
    pub hazard_cost_threshold: f64,
    /// The length of the closed track in m; `s` wraps to 0 here.
    pub max_s: f64,
    /// A point inside the track loop, used to decide the sign of lateral offsets.
    pub track_centre: [f64; 2],
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            lane_width: 4.0,
            meters_ahead: 30.0,
            target_x: 30.0,
            steps_count: 50,
            time_step: 0.02,
            mph_per_mps: 2.24,
            cars_min_distance: 30.0,
            max_velocity: 49.5,
            velocity_step: 0.25,
            occupancy_margin: 5.0,
            very_close_distance: 10.0,
            off_centre_penalty: 0.2,
            lane_centre_tolerance: 1.0,
            hazard_cost_threshold: 0.9,
            max_s: 6945.554,
            track_centre: [1000.0, 2000.0],
        }
    }
}

impl PlannerConfig {
    /// Loads a TOML parameter file. Keys missing from the file take their default values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let params_str = std::fs::read_to_string(path)?;
        Self::from_toml(&params_str)
    }

    /// Parses and validates parameters from a TOML string.
    pub fn from_toml(params_str: &str) -> Result<Self, LoadError> {
        let config: Self = toml::from_str(params_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the parameters describe a plannable configuration.
    pub fn validate(&self) -> Result<(), LoadError> {
        let invalid = |name: &'static str, reason: &'static str| -> Result<(), LoadError> {
            Err(LoadError::Invalid { name, reason })
        };
        let positive = [
            ("lane_width", self.lane_width),
            ("meters_ahead", self.meters_ahead),
            ("target_x", self.target_x),
            ("time_step", self.time_step),
            ("mph_per_mps", self.mph_per_mps),
            ("max_s", self.max_s),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return invalid(name, "must be positive and finite");
            }
        }
        if self.steps_count < 2 {
            return invalid("steps_count", "must be at least 2");
        }
        if !(self.max_velocity >= 0.0) {
            return invalid("max_velocity", "must not be negative");
        }
        if !(self.velocity_step >= 0.0) {
            return invalid("velocity_step", "must not be negative");
        }
        Ok(())
    }

    /// The lateral extent of a lane.
    pub fn lane_band(&self, lane: usize) -> Interval<f64> {
        let lane = lane as f64;
        Interval::new(self.lane_width * lane, self.lane_width * (lane + 1.0))
    }

    /// The lateral offset of a lane's centre line.
    pub fn lane_centre(&self, lane: usize) -> f64 {
        self.lane_band(lane).midpoint()
    }

    /// The distance covered in one time step at 1 mph, in m.
    pub fn step_distance_per_mph(&self) -> f64 {
        self.time_step / self.mph_per_mps
    }

    /// The track centre as a point.
    pub fn track_centre(&self) -> Point2d {
        Point2d::new(self.track_centre[0], self.track_centre[1])
    }
}
