pub use cgmath;
pub use config::{LoadError, PlannerConfig, LANE_COUNT};
pub use cost::lane_cost;
pub use hazard::{detect_hazard, Hazard, HazardQuery};
pub use map::{MapError, MapLoadError, RoadPosition, Waypoint, WaypointMap};
pub use planner::{CycleInput, LaneEvaluation, PlanError, Planner, PlannerState};
pub use trajectory::{PathRequest, Trajectory, TrajectoryGenerator};
pub use util::Interval;
pub use vehicle::{SensedVehicle, VehiclePose};

mod config;
mod cost;
mod hazard;
mod map;
pub mod math;
mod planner;
pub mod telemetry;
mod trajectory;
mod util;
mod vehicle;

#[cfg(test)]
mod fixtures;
