//! Tests that drive a vehicle around a circular track for many planning cycles.

use assert_approx_eq::assert_approx_eq;
use highway_planner::cgmath::prelude::*;
use highway_planner::math::{heading_of, heading_vector, Point2d, Vector2d};
use highway_planner::{
    telemetry, CycleInput, Planner, PlannerConfig, PlannerState, RoadPosition, SensedVehicle,
    Trajectory, VehiclePose, Waypoint, WaypointMap,
};
use std::f64::consts::PI;

const TRACK_RADIUS: f64 = 500.0;
const TRACK_WAYPOINTS: usize = 360;

/// Trajectory points the vehicle drives between two cycles.
const CONSUMED_POINTS: usize = 3;

/// A planner for an anticlockwise circular track around the default track centre.
fn circular_planner() -> Planner {
    let mut config = PlannerConfig::default();
    let chord = 2.0 * TRACK_RADIUS * (PI / TRACK_WAYPOINTS as f64).sin();
    config.max_s = chord * TRACK_WAYPOINTS as f64;

    let centre = config.track_centre();
    let waypoints = (0..TRACK_WAYPOINTS)
        .map(|i| {
            let normal = heading_vector(2.0 * PI * i as f64 / TRACK_WAYPOINTS as f64);
            let pos = centre + normal * TRACK_RADIUS;
            Waypoint::new(pos.x, pos.y, chord * i as f64, normal.x, normal.y)
        })
        .collect();

    let map = WaypointMap::new(waypoints, &config).unwrap();
    Planner::new(map, config)
}

/// A vehicle at rest at the given road position, facing along the track.
fn start_at(planner: &Planner, s: f64, d: f64) -> CycleInput {
    let heading = 2.0 * PI * s / planner.config().max_s + PI / 2.0;
    CycleInput {
        pose: VehiclePose {
            pos: planner.map().to_cartesian(s, d),
            road: RoadPosition { s, d },
            yaw: heading.to_degrees(),
            speed: 0.0,
        },
        previous_path: vec![],
        end_path: RoadPosition::default(),
        sensor_fusion: vec![],
    }
}

fn parked(planner: &Planner, id: u32, s: f64, d: f64) -> SensedVehicle {
    SensedVehicle {
        id,
        pos: planner.map().to_cartesian(s, d),
        vel: Vector2d::zero(),
        road: RoadPosition { s, d },
    }
}

/// Moves the vehicle along the first few points of a trajectory, as the simulator would.
fn drive(planner: &Planner, input: &CycleInput, trajectory: &Trajectory) -> CycleInput {
    let config = planner.config();
    let points = trajectory.points();
    let (pos, prev) = (points[CONSUMED_POINTS - 1], points[CONSUMED_POINTS - 2]);

    let step = pos - prev;
    let heading = if step.magnitude2() > 0.0 {
        heading_of(step)
    } else {
        input.pose.heading()
    };
    let end_heading = trajectory.end_heading().unwrap_or(heading);
    let previous_path = points[CONSUMED_POINTS..].to_vec();

    CycleInput {
        pose: VehiclePose {
            pos,
            road: planner.map().to_road_frame(pos, heading),
            yaw: heading.to_degrees(),
            speed: step.magnitude() / config.time_step * config.mph_per_mps,
        },
        end_path: planner.map().to_road_frame(points[points.len() - 1], end_heading),
        previous_path,
        sensor_fusion: input.sensor_fusion.clone(),
    }
}

#[test]
fn empty_road_accelerates_to_the_ceiling() {
    let planner = circular_planner();
    let config = planner.config().clone();
    let mut state = PlannerState::default();
    let mut input = start_at(&planner, 100.0, 6.0);

    for cycle in 1..=250 {
        let trajectory = planner.plan(&mut state, &input).unwrap();
        assert_eq!(trajectory.len(), config.steps_count);
        assert_eq!(state.lane, 1);
        assert_approx_eq!(
            state.reference_velocity,
            f64::min(cycle as f64 * config.velocity_step, config.max_velocity)
        );

        // The trajectory continues where the last one left off without jumps
        let kept = input.previous_path.len().min(2);
        assert_eq!(trajectory.points()[..kept], input.previous_path[..kept]);
        let max_step = config.max_velocity * config.step_distance_per_mph();
        for pair in trajectory.points().windows(2) {
            assert!(pair[0].distance(pair[1]) < max_step + 0.01);
        }

        input = drive(&planner, &input, &trajectory);
    }

    // Still in the middle of the centre lane
    assert_approx_eq!(input.pose.road.d, 6.0, 0.5);
}

#[test]
fn changes_lane_around_a_parked_vehicle() {
    let planner = circular_planner();
    let obstacle = parked(&planner, 7, 300.0, 6.0);
    let mut state = PlannerState {
        lane: 1,
        reference_velocity: 30.0,
    };
    let mut input = start_at(&planner, 200.0, 6.0);
    input.sensor_fusion = vec![obstacle];

    let mut lanes = vec![];
    for _ in 0..400 {
        let previous_lane = state.lane;
        let trajectory = planner.plan(&mut state, &input).unwrap();
        assert!(state.lane < 3);
        assert!(state.lane.abs_diff(previous_lane) <= 1);
        lanes.push(state.lane);

        for point in trajectory.points() {
            assert!(point.distance(obstacle.pos) > 2.5, "too close to the parked vehicle");
        }

        input = drive(&planner, &input, &trajectory);
        if input.pose.road.s > 330.0 {
            break;
        }
    }

    assert!(input.pose.road.s > 330.0, "never got past the parked vehicle");
    // The first free lane to the left is preferred
    assert_eq!(lanes[0], 0);
}

#[test]
fn brakes_hard_for_a_stationary_vehicle_close_ahead() {
    let planner = circular_planner();
    let mut state = PlannerState {
        lane: 1,
        reference_velocity: 40.0,
    };
    let mut input = start_at(&planner, 200.0, 6.0);
    input.sensor_fusion = (0..3)
        .map(|lane| parked(&planner, lane as u32, 220.0, planner.config().lane_centre(lane)))
        .collect();

    planner.plan(&mut state, &input).unwrap();
    assert_eq!(state.lane, 1);
    assert_approx_eq!(state.reference_velocity, 39.25);
}

#[test]
fn answers_telemetry_frames() {
    let planner = circular_planner();
    let mut state = PlannerState::default();
    let input = start_at(&planner, 100.0, 6.0);

    let frame = format!(
        "42{}",
        serde_json::json!(["telemetry", {
            "x": input.pose.pos.x, "y": input.pose.pos.y,
            "s": input.pose.road.s, "d": input.pose.road.d,
            "yaw": input.pose.yaw, "speed": 0.0,
            "previous_path_x": [], "previous_path_y": [],
            "end_path_s": 0.0, "end_path_d": 0.0,
            "sensor_fusion": [[0, 0.0, 0.0, 0.0, 0.0, 900.0, 10.0]],
        }])
    );

    let decoded = match telemetry::decode(&frame).unwrap() {
        telemetry::Inbound::Telemetry(decoded) => decoded,
        other => panic!("unexpected frame {:?}", other),
    };
    let trajectory = planner.plan(&mut state, &decoded).unwrap();
    let reply = telemetry::encode_control(&trajectory);

    let body: serde_json::Value = serde_json::from_str(reply.strip_prefix("42").unwrap()).unwrap();
    assert_eq!(body[0], "control");
    let xs = body[1]["next_x"].as_array().unwrap();
    let ys = body[1]["next_y"].as_array().unwrap();
    assert_eq!(xs.len(), planner.config().steps_count);
    assert_eq!(ys.len(), xs.len());

    let first = Point2d::new(xs[0].as_f64().unwrap(), ys[0].as_f64().unwrap());
    assert!(first.distance(input.pose.pos) < 0.1);
}
