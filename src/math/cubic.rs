//! Cubic polynomial segments.

use serde::{Deserialize, Serialize};

/// A cubic function of a shifted variable, `y = a(x - x0)^3 + b(x - x0)^2 + c(x - x0) + d`.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct CubicFn {
    coeffs: [f64; 4],
    offset: f64,
}

impl CubicFn {
    /// Creates a cubic from its coefficients, highest order first,
    /// expanded about the point `x0`.
    pub fn new(coeffs: [f64; 4], x0: f64) -> Self {
        Self {
            coeffs,
            offset: -x0,
        }
    }

    /// Creates the straight line through `(x0, y0)` with the given slope.
    pub fn line(x0: f64, y0: f64, slope: f64) -> Self {
        Self::new([0.0, 0.0, slope, y0], x0)
    }

    pub fn y(&self, x: f64) -> f64 {
        self.y_and_dy(x).0
    }

    pub fn dy(&self, x: f64) -> f64 {
        self.y_and_dy(x).1
    }

    pub fn y_and_dy(&self, x: f64) -> (f64, f64) {
        let c = &self.coeffs;
        let x = x + self.offset;

        let y = c[0] * x * x * x + c[1] * x * x + c[2] * x + c[3];
        let dy = c[0] * 3. * x * x + c[1] * 2. * x + c[2];

        (y, dy)
    }
}
