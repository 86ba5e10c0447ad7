//! Natural cubic spline for smooth optical-constant curves.
//!
//! Used when the `cubic` interpolation mode is selected. Between knots the
//! curve has continuous first and second derivatives; outside the knot range
//! it continues along the tangent at the nearest end knot.

use crate::interp::check_knots;
use crate::provider::MaterialError;

/// A natural cubic spline interpolator for real-valued data.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    /// Strictly increasing knots.
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivatives at each knot.
    y2s: Vec<f64>,
}

impl CubicSpline {
    /// Construct a natural cubic spline through `(xs[i], ys[i])`.
    ///
    /// # Errors
    /// `DataFormat` if the lengths differ, fewer than two knots are given, or
    /// `xs` is not strictly increasing.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Result<Self, MaterialError> {
        check_knots(&xs, &ys)?;

        let n = xs.len();
        let mut y2s = vec![0.0; n];
        let mut u = vec![0.0; n - 1];

        // Forward sweep of the tridiagonal system
        for i in 1..n - 1 {
            let sig = (xs[i] - xs[i - 1]) / (xs[i + 1] - xs[i - 1]);
            let p = sig * y2s[i - 1] + 2.0;
            y2s[i] = (sig - 1.0) / p;
            u[i] = (ys[i + 1] - ys[i]) / (xs[i + 1] - xs[i])
                - (ys[i] - ys[i - 1]) / (xs[i] - xs[i - 1]);
            u[i] = (6.0 * u[i] / (xs[i + 1] - xs[i - 1]) - sig * u[i - 1]) / p;
        }

        for k in (0..n - 2).rev() {
            y2s[k + 1] = y2s[k + 1] * y2s[k + 2] + u[k + 1];
        }

        Ok(Self { xs, ys, y2s })
    }

    /// Evaluate the spline at `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        let n = self.xs.len();

        if x < self.xs[0] {
            let slope = self.end_slope(0, 1, true);
            return self.ys[0] + slope * (x - self.xs[0]);
        }
        if x > self.xs[n - 1] {
            let slope = self.end_slope(n - 2, n - 1, false);
            return self.ys[n - 1] + slope * (x - self.xs[n - 1]);
        }

        let (lo, hi) = bracket(&self.xs, x);
        let h = self.xs[hi] - self.xs[lo];
        let a = (self.xs[hi] - x) / h;
        let b = (x - self.xs[lo]) / h;

        a * self.ys[lo]
            + b * self.ys[hi]
            + ((a * a * a - a) * self.y2s[lo] + (b * b * b - b) * self.y2s[hi]) * h * h / 6.0
    }

    /// First derivative of the segment `[lo, hi]` at its left or right end.
    fn end_slope(&self, lo: usize, hi: usize, at_left: bool) -> f64 {
        let h = self.xs[hi] - self.xs[lo];
        let secant = (self.ys[hi] - self.ys[lo]) / h;
        if at_left {
            secant - h * (2.0 * self.y2s[lo] + self.y2s[hi]) / 6.0
        } else {
            secant + h * (self.y2s[lo] + 2.0 * self.y2s[hi]) / 6.0
        }
    }
}

/// Binary search for the knot interval `[lo, hi]` enclosing `x`.
///
/// `x` must lie within `[xs[0], xs[n-1]]`.
pub(crate) fn bracket(xs: &[f64], x: f64) -> (usize, usize) {
    let mut lo = 0;
    let mut hi = xs.len() - 1;
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if xs[mid] > x {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    (lo, hi)
}
