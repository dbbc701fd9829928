use crate::map::RoadPosition;
use crate::math::{Point2d, Vector2d};
use cgmath::prelude::*;

/// The instantaneous state of the vehicle being planned for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehiclePose {
    /// The world space coordinates of the vehicle.
    pub pos: Point2d,
    /// The vehicle's position in road coordinates.
    pub road: RoadPosition,
    /// The vehicle's heading in degrees.
    pub yaw: f64,
    /// The vehicle's speed in mph.
    pub speed: f64,
}

/// The last known state of another vehicle, as reported by sensor fusion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SensedVehicle {
    /// The vehicle's ID
    pub id: u32,
    /// The world space coordinates of the vehicle.
    pub pos: Point2d,
    /// The vehicle's velocity in m/s.
    pub vel: Vector2d,
    /// The vehicle's position in road coordinates.
    pub road: RoadPosition,
}

impl VehiclePose {
    /// The vehicle's heading in radians.
    pub fn heading(&self) -> f64 {
        self.yaw.to_radians()
    }
}

impl SensedVehicle {
    /// The vehicle's scalar speed in m/s.
    pub fn speed(&self) -> f64 {
        self.vel.magnitude()
    }

    /// The longitudinal position the vehicle would reach after `duration` seconds
    /// at its current speed.
    pub fn projected_s(&self, duration: f64) -> f64 {
        self.road.s + duration * self.speed()
    }
}
