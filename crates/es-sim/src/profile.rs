//! Load profiles: named sequences of control values on a fixed timestep.

use crate::error::{SimError, SimResult};

/// Control values applied one per timestep.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadProfile {
    pub name: String,
    /// Timestep [min]
    pub ts_min: f64,
    pub values: Vec<f64>,
}

impl LoadProfile {
    /// Profile from an explicit control sequence.
    pub fn from_values(name: impl Into<String>, ts_min: f64, values: Vec<f64>) -> SimResult<Self> {
        if !(ts_min.is_finite() && ts_min > 0.0) {
            return Err(SimError::InvalidArg {
                what: "profile timestep must be positive",
            });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(SimError::InvalidArg {
                what: "profile values must be finite",
            });
        }
        Ok(Self {
            name: name.into(),
            ts_min,
            values,
        })
    }

    /// `value` for every one of `steps` steps.
    pub fn constant(
        name: impl Into<String>,
        ts_min: f64,
        value: f64,
        steps: usize,
    ) -> SimResult<Self> {
        Self::from_values(name, ts_min, vec![value; steps])
    }

    /// `value` up to and including step `steps / 2`, then 0.
    pub fn hold_then_release(
        name: impl Into<String>,
        ts_min: f64,
        value: f64,
        steps: usize,
    ) -> SimResult<Self> {
        let half = steps as f64 / 2.0;
        let values = (0..steps)
            .map(|i| if i as f64 <= half { value } else { 0.0 })
            .collect();
        Self::from_values(name, ts_min, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Covered time span [min].
    pub fn duration_min(&self) -> f64 {
        self.values.len() as f64 * self.ts_min
    }
}
