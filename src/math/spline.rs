use super::CubicFn;
use smallvec::SmallVec;
use thiserror::Error;

/// An error raised while fitting a [Spline].
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum SplineError {
    #[error("a spline needs at least two knots, got {0}")]
    TooFewKnots(usize),

    #[error("spline knots must be strictly increasing (knot {index} at x = {x})")]
    NonIncreasing { index: usize, x: f64 },

    #[error("knot and value counts differ ({knots} knots, {values} values)")]
    LengthMismatch { knots: usize, values: usize },
}

/// A natural cubic spline `y(x)`, extrapolated linearly beyond its end knots.
#[derive(Clone, Debug)]
pub struct Spline {
    /// The knot x-values, strictly increasing.
    knots: SmallVec<[f64; 8]>,
    /// One segment per interval between knots, plus a linear extension at each end.
    /// Segment `i` covers `knots[i - 1] <= x < knots[i]`.
    segments: SmallVec<[CubicFn; 9]>,
}

impl Spline {
    /// Fits a natural cubic spline through the points `(xs[i], ys[i])`.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Result<Self, SplineError> {
        let n = xs.len();
        if n != ys.len() {
            return Err(SplineError::LengthMismatch {
                knots: n,
                values: ys.len(),
            });
        }
        if n < 2 {
            return Err(SplineError::TooFewKnots(n));
        }
        if let Some(index) = (1..n).find(|&i| !(xs[i] > xs[i - 1])) {
            return Err(SplineError::NonIncreasing { index, x: xs[index] });
        }

        let h = (0..n - 1)
            .map(|i| xs[i + 1] - xs[i])
            .collect::<SmallVec<[f64; 8]>>();

        // Solve the tridiagonal system for the quadratic coefficients,
        // with zero curvature at both ends.
        let mut mu = SmallVec::<[f64; 8]>::from_elem(0.0, n);
        let mut z = SmallVec::<[f64; 8]>::from_elem(0.0, n);
        for i in 1..n - 1 {
            let alpha = 3.0 / h[i] * (ys[i + 1] - ys[i]) - 3.0 / h[i - 1] * (ys[i] - ys[i - 1]);
            let l = 2.0 * (xs[i + 1] - xs[i - 1]) - h[i - 1] * mu[i - 1];
            mu[i] = h[i] / l;
            z[i] = (alpha - h[i - 1] * z[i - 1]) / l;
        }

        let mut c = SmallVec::<[f64; 8]>::from_elem(0.0, n);
        let mut b = SmallVec::<[f64; 8]>::from_elem(0.0, n);
        let mut d = SmallVec::<[f64; 8]>::from_elem(0.0, n);
        for j in (0..n - 1).rev() {
            c[j] = z[j] - mu[j] * c[j + 1];
            b[j] = (ys[j + 1] - ys[j]) / h[j] - h[j] * (c[j + 1] + 2.0 * c[j]) / 3.0;
            d[j] = (c[j + 1] - c[j]) / (3.0 * h[j]);
        }

        let interior = (0..n - 1).map(|j| CubicFn::new([d[j], c[j], b[j], ys[j]], xs[j]));
        let last = n - 2;
        let end_slope = b[last] + 2.0 * c[last] * h[last] + 3.0 * d[last] * h[last].powi(2);

        let mut segments = SmallVec::new();
        segments.push(CubicFn::line(xs[0], ys[0], b[0]));
        segments.extend(interior);
        segments.push(CubicFn::line(xs[n - 1], ys[n - 1], end_slope));

        Ok(Self {
            knots: SmallVec::from_slice(xs),
            segments,
        })
    }

    /// Samples the spline.
    pub fn y(&self, x: f64) -> f64 {
        self.segment(x).y(x)
    }

    /// Samples the spline's derivative.
    pub fn dy(&self, x: f64) -> f64 {
        self.segment(x).dy(x)
    }

    fn segment(&self, x: f64) -> &CubicFn {
        let idx = self.knots.partition_point(|k| *k <= x);
        &self.segments[idx]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn interpolates_knots() {
        let xs = [-2.0, 0.0, 30.0, 60.0, 90.0];
        let ys = [0.1, 0.0, 2.0, 4.0, 4.0];
        let spline = Spline::fit(&xs, &ys).unwrap();
        for (x, y) in xs.iter().zip(ys.iter()) {
            assert_approx_eq!(spline.y(*x), *y, 1e-9);
        }
    }

    #[test]
    fn continuous_at_knots() {
        let xs = [0.0, 1.0, 3.0, 4.5, 7.0];
        let ys = [1.0, -2.0, 0.5, 3.0, 2.0];
        let spline = Spline::fit(&xs, &ys).unwrap();
        for x in &xs[1..4] {
            let eps = 1e-7;
            assert_approx_eq!(spline.y(x - eps), spline.y(x + eps), 1e-5);
            assert_approx_eq!(spline.dy(x - eps), spline.dy(x + eps), 1e-4);
        }
    }

    #[test]
    fn straight_line_stays_straight() {
        let xs = [0.0, 10.0, 25.0, 40.0];
        let ys = xs.map(|x| 0.5 * x + 3.0);
        let spline = Spline::fit(&xs, &ys).unwrap();
        for x in [-10.0, 5.0, 17.0, 33.0, 100.0] {
            assert_approx_eq!(spline.y(x), 0.5 * x + 3.0, 1e-9);
            assert_approx_eq!(spline.dy(x), 0.5, 1e-9);
        }
    }

    #[test]
    fn extrapolates_linearly() {
        let spline = Spline::fit(&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0]).unwrap();
        let slope = spline.dy(2.0);
        assert_approx_eq!(spline.y(5.0), 3.0 * slope, 1e-9);
        assert_approx_eq!(spline.dy(5.0), slope, 1e-9);
    }

    #[test]
    fn rejects_degenerate_knots() {
        assert_eq!(Spline::fit(&[1.0], &[1.0]).unwrap_err(), SplineError::TooFewKnots(1));
        assert!(matches!(
            Spline::fit(&[0.0, 1.0, 1.0], &[0.0, 1.0, 2.0]),
            Err(SplineError::NonIncreasing { index: 2, .. })
        ));
        assert!(matches!(
            Spline::fit(&[0.0, 1.0], &[0.0]),
            Err(SplineError::LengthMismatch { .. })
        ));
    }
}
