//! Piecewise-linear characteristic curves with flat extrapolation.
//!
//! Efficiency curves (`eta`, `eta_mc`), the load-change bulk-energy curve and the
//! derived input-power efficiency table all share this representation.

use crate::error::{ComponentError, ComponentResult};
use serde::{Deserialize, Serialize};

/// Serialized form of a curve: two parallel sample sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveDef {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl CurveDef {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self { x, y }
    }

    /// Single-sample curve, constant everywhere.
    pub fn constant(y: f64) -> Self {
        Self {
            x: vec![0.0],
            y: vec![y],
        }
    }
}

/// Validated sample table `f(x) -> y`.
///
/// Between samples the value is interpolated linearly, outside `[x0, xn]` the
/// boundary sample is returned. Repeated x samples form a step.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve1D {
    name: &'static str,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Curve1D {
    pub fn new(name: &'static str, x: Vec<f64>, y: Vec<f64>) -> ComponentResult<Self> {
        if x.is_empty() {
            return Err(ComponentError::Curve {
                curve: name,
                what: "no samples".to_string(),
            });
        }
        if x.len() != y.len() {
            return Err(ComponentError::Curve {
                curve: name,
                what: format!("x has {} samples but y has {}", x.len(), y.len()),
            });
        }
        if let Some(i) = x.iter().chain(y.iter()).position(|v| !v.is_finite()) {
            return Err(ComponentError::Curve {
                curve: name,
                what: format!("non-finite sample at position {i}"),
            });
        }
        if let Some(i) = x.windows(2).position(|w| w[1] < w[0]) {
            return Err(ComponentError::Curve {
                curve: name,
                what: format!(
                    "x must be non-decreasing (x[{}] = {} > x[{}] = {})",
                    i,
                    x[i],
                    i + 1,
                    x[i + 1]
                ),
            });
        }
        Ok(Self { name, x, y })
    }

    pub fn from_def(name: &'static str, def: &CurveDef) -> ComponentResult<Self> {
        Self::new(name, def.x.clone(), def.y.clone())
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn y_min(&self) -> f64 {
        self.y.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn y_max(&self) -> f64 {
        self.y.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// x of the first sample holding the maximum y.
    pub fn x_at_y_max(&self) -> f64 {
        let y_max = self.y_max();
        let i = self.y.iter().position(|&v| v == y_max).unwrap_or(0);
        self.x[i]
    }

    /// Evaluate the curve at `p`.
    pub fn eval(&self, p: f64) -> f64 {
        if p.is_nan() {
            return f64::NAN;
        }
        let n = self.x.len();
        if p <= self.x[0] {
            return self.y[0];
        }
        if p >= self.x[n - 1] {
            return self.y[n - 1];
        }
        // x[lo] <= p < x[hi], so x[hi] > x[lo] even with repeated samples
        let hi = self.x.partition_point(|&v| v <= p);
        let lo = hi - 1;
        let t = (p - self.x[lo]) / (self.x[hi] - self.x[lo]);
        self.y[lo] + t * (self.y[hi] - self.y[lo])
    }
}
