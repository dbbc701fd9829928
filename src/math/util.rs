use super::{Point2d, Vector2d};
use cgmath::prelude::*;

/// Projects a point onto a local coordinate system.
///
/// # Parameters
/// * `point` - The point to project
/// * `origin` - The origin of the coordinate system
/// * `x_axis` - The basis vector pointing in the positive x-axis.
/// * `y_axis` - The basis vector pointing in the positive y-axis.
pub fn project_local(
    point: Point2d,
    origin: Point2d,
    x_axis: Vector2d,
    y_axis: Vector2d,
) -> Point2d {
    let point = point - origin;
    Point2d::new(point.dot(x_axis), point.dot(y_axis))
}

/// The inverse of [project_local], mapping a local point back into world space.
pub fn unproject_local(
    point: Point2d,
    origin: Point2d,
    x_axis: Vector2d,
    y_axis: Vector2d,
) -> Point2d {
    origin + point.x * x_axis + point.y * y_axis
}

/// Rotates a vector 90 degrees anticlockwise.
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}

/// A unit vector pointing along the given heading, in radians.
pub fn heading_vector(heading: f64) -> Vector2d {
    Vector2d::new(heading.cos(), heading.sin())
}

/// The heading of a vector in radians, in the range `(-pi, pi]`.
pub fn heading_of(vec: Vector2d) -> f64 {
    vec.y.atan2(vec.x)
}

/// The absolute difference between two headings, wrapped into `[0, pi]`.
pub fn heading_difference(a: f64, b: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let diff = (a - b).rem_euclid(TAU);
    if diff > PI {
        TAU - diff
    } else {
        diff
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::f64::consts::PI;

    #[test]
    fn local_projection_round_trips() {
        let origin = Point2d::new(12.0, -3.0);
        let x_axis = heading_vector(0.7);
        let y_axis = rot90(x_axis);
        let point = Point2d::new(20.0, 5.0);

        let local = project_local(point, origin, x_axis, y_axis);
        let world = unproject_local(local, origin, x_axis, y_axis);
        assert_approx_eq!(world.x, point.x);
        assert_approx_eq!(world.y, point.y);
    }

    #[test]
    fn heading_along_x_axis_is_origin_aligned() {
        let origin = Point2d::new(5.0, 5.0);
        let x_axis = heading_vector(PI / 2.0);
        let local = project_local(Point2d::new(5.0, 8.0), origin, x_axis, rot90(x_axis));
        assert_approx_eq!(local.x, 3.0);
        assert_approx_eq!(local.y, 0.0);
    }

    #[test]
    fn heading_difference_wraps() {
        assert_approx_eq!(heading_difference(0.1, -0.1), 0.2);
        assert_approx_eq!(heading_difference(PI - 0.1, -PI + 0.1), 0.2);
        assert_approx_eq!(heading_difference(3.0 * PI, 0.0), PI);
        assert_approx_eq!(heading_of(Vector2d::new(0.0, 2.0)), PI / 2.0);
    }
}
