//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

/// An interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: std::cmp::PartialOrd> Interval<T> {
    /// Returns true if this interval contains the value, including its end points.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }

    /// Returns true if the value lies strictly between the end points.
    pub fn contains_exclusive(&self, value: T) -> bool {
        value > self.min && value < self.max
    }
}

impl Interval<f64> {
    /// Creates an interval with the given centre and radius.
    pub fn disc(centre: f64, radius: f64) -> Self {
        Self {
            min: centre - radius,
            max: centre + radius,
        }
    }

    /// Returns the centre/mid-point of the interval.
    pub fn midpoint(&self) -> f64 {
        0.5 * (self.min + self.max)
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}

/// Wraps a longitudinal position onto a closed track of the given length,
/// returning a value in `[0, period)`.
pub fn wrap_position(pos: f64, period: f64) -> f64 {
    let wrapped = pos.rem_euclid(period);
    // `rem_euclid` can round up to `period` for tiny negative inputs
    if wrapped >= period {
        0.0
    } else {
        wrapped
    }
}

/// The signed distance from `from` to `to` along a closed track,
/// taking whichever direction is shorter. The result lies in `[-period / 2, period / 2)`.
pub fn wrapped_difference(to: f64, from: f64, period: f64) -> f64 {
    let half = 0.5 * period;
    wrap_position(to - from + half, period) - half
}
