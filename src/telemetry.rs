//! The text frames exchanged with the driving simulator.
//!
//! A message event is the prefix `42` followed by a JSON array of `[event, payload]`.
//! The simulator sends `telemetry` events; the planner answers each one with either
//! a `control` frame carrying a trajectory or a `manual` frame handing control back.

use crate::map::RoadPosition;
use crate::math::{Point2d, Vector2d};
use crate::planner::CycleInput;
use crate::trajectory::Trajectory;
use crate::vehicle::{SensedVehicle, VehiclePose};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

/// The prefix of a socket.io message event.
const EVENT_PREFIX: &str = "42";

/// An error decoding a frame from the simulator.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected an array of [event, payload]")]
    NotAnEvent,

    #[error("Previous path has {x} x-coordinates but {y} y-coordinates")]
    PathLengthMismatch { x: usize, y: usize },
}

/// A decoded frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Inbound {
    /// A telemetry update to plan for.
    Telemetry(CycleInput),
    /// An event without a payload, to be answered with [encode_manual].
    NoData,
    /// Anything that needs no reply.
    Ignored,
}

/// The payload of a `telemetry` event.
#[derive(Deserialize)]
struct TelemetryPayload {
    x: f64,
    y: f64,
    s: f64,
    d: f64,
    yaw: f64,
    speed: f64,
    previous_path_x: Vec<f64>,
    previous_path_y: Vec<f64>,
    end_path_s: f64,
    end_path_d: f64,
    /// Rows of `[id, x, y, vx, vy, s, d]`.
    sensor_fusion: Vec<[f64; 7]>,
}

impl TelemetryPayload {
    fn into_cycle_input(self) -> Result<CycleInput, TelemetryError> {
        if self.previous_path_x.len() != self.previous_path_y.len() {
            return Err(TelemetryError::PathLengthMismatch {
                x: self.previous_path_x.len(),
                y: self.previous_path_y.len(),
            });
        }

        let previous_path = self
            .previous_path_x
            .iter()
            .zip(&self.previous_path_y)
            .map(|(x, y)| Point2d::new(*x, *y))
            .collect();

        let sensor_fusion = self
            .sensor_fusion
            .iter()
            .map(|[id, x, y, vx, vy, s, d]| SensedVehicle {
                id: *id as u32,
                pos: Point2d::new(*x, *y),
                vel: Vector2d::new(*vx, *vy),
                road: RoadPosition { s: *s, d: *d },
            })
            .collect();

        Ok(CycleInput {
            pose: VehiclePose {
                pos: Point2d::new(self.x, self.y),
                road: RoadPosition {
                    s: self.s,
                    d: self.d,
                },
                yaw: self.yaw,
                speed: self.speed,
            },
            previous_path,
            end_path: RoadPosition {
                s: self.end_path_s,
                d: self.end_path_d,
            },
            sensor_fusion,
        })
    }
}

/// Decodes a frame received from the simulator.
pub fn decode(frame: &str) -> Result<Inbound, TelemetryError> {
    let body = match frame.trim().strip_prefix(EVENT_PREFIX) {
        Some(body) if !body.is_empty() => body,
        _ => return Ok(Inbound::Ignored),
    };

    let mut message = match serde_json::from_str::<Value>(body)? {
        Value::Array(items) => items.into_iter(),
        _ => return Err(TelemetryError::NotAnEvent),
    };
    let event = match message.next() {
        Some(Value::String(event)) => event,
        _ => return Err(TelemetryError::NotAnEvent),
    };
    let payload = match message.next() {
        None | Some(Value::Null) => return Ok(Inbound::NoData),
        Some(payload) => payload,
    };

    if event != "telemetry" {
        return Ok(Inbound::Ignored);
    }
    let payload: TelemetryPayload = serde_json::from_value(payload)?;
    Ok(Inbound::Telemetry(payload.into_cycle_input()?))
}

/// Encodes a trajectory for the simulator to follow.
pub fn encode_control(trajectory: &Trajectory) -> String {
    let message = json!([
        "control",
        {
            "next_x": trajectory.xs(),
            "next_y": trajectory.ys(),
        }
    ]);
    format!("{}{}", EVENT_PREFIX, message)
}

/// Encodes a reply that hands the vehicle back to manual control.
pub fn encode_manual() -> String {
    format!("{}{}", EVENT_PREFIX, json!(["manual", {}]))
}
