//! One-dimensional interpolants over strictly increasing knots.
//!
//! Both modes reproduce the knot values exactly and extrapolate along a
//! straight line outside the knot range.

use serde::{Deserialize, Serialize};

use crate::provider::MaterialError;
use crate::spline::{bracket, CubicSpline};

/// Interpolation scheme for tabulated optical constants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Piecewise linear, extrapolated from the end segments.
    #[default]
    Linear,
    /// Natural cubic spline, extrapolated along the end tangents.
    Cubic,
}

/// Validate a knot set: equal lengths, at least two knots, strictly
/// increasing finite abscissae and finite ordinates.
pub(crate) fn check_knots(xs: &[f64], ys: &[f64]) -> Result<(), MaterialError> {
    if xs.len() != ys.len() {
        return Err(MaterialError::DataFormat {
            line: 0,
            message: format!("{} knots but {} values", xs.len(), ys.len()),
        });
    }
    if xs.len() < 2 {
        return Err(MaterialError::DataFormat {
            line: 0,
            message: "At least two distinct samples are required".into(),
        });
    }
    if let Some(i) = xs.iter().chain(ys).position(|v| !v.is_finite()) {
        return Err(MaterialError::DataFormat {
            line: 0,
            message: format!("Non-finite value at sample {}", i % xs.len()),
        });
    }
    for i in 1..xs.len() {
        if xs[i] <= xs[i - 1] {
            return Err(MaterialError::DataFormat {
                line: 0,
                message: format!("Knots must be strictly increasing at index {}", i),
            });
        }
    }
    Ok(())
}

/// Piecewise-linear interpolant with linear extrapolation.
#[derive(Debug, Clone)]
pub struct LinearInterpolant {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl LinearInterpolant {
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Result<Self, MaterialError> {
        check_knots(&xs, &ys)?;
        Ok(Self { xs, ys })
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let n = self.xs.len();
        let (lo, hi) = if x < self.xs[0] {
            (0, 1)
        } else if x > self.xs[n - 1] {
            (n - 2, n - 1)
        } else {
            bracket(&self.xs, x)
        };

        let t = (x - self.xs[lo]) / (self.xs[hi] - self.xs[lo]);
        self.ys[lo] * (1.0 - t) + self.ys[hi] * t
    }
}

/// A real-valued curve built with either interpolation scheme.
#[derive(Debug, Clone)]
pub enum Curve {
    Linear(LinearInterpolant),
    Cubic(CubicSpline),
}

impl Curve {
    pub fn new(mode: Interpolation, xs: Vec<f64>, ys: Vec<f64>) -> Result<Self, MaterialError> {
        Ok(match mode {
            Interpolation::Linear => Curve::Linear(LinearInterpolant::new(xs, ys)?),
            Interpolation::Cubic => Curve::Cubic(CubicSpline::new(xs, ys)?),
        })
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        match self {
            Curve::Linear(l) => l.evaluate(x),
            Curve::Cubic(c) => c.evaluate(x),
        }
    }
}
