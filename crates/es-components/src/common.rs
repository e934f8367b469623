//! Common utilities for component calculations.

use crate::error::{ComponentError, ComponentResult};
use es_core::numeric::ensure_finite;

/// Time tolerance (min) for arrival-time comparisons inside one timestep.
pub const EPSILON_TIME: f64 = 1e-9;

/// Tolerance on relative power when snapping onto the minimum-load boundary.
pub const EPSILON_REL: f64 = 1e-12;

/// Default absolute tolerance (kWh / kW) for split and balance checks.
pub const DEFAULT_BALANCE_TOL: f64 = 1e-5;

/// Ensure a value is finite, returning ComponentError if not.
pub fn check_finite(value: f64, what: &'static str) -> ComponentResult<()> {
    ensure_finite(value, what).map_err(|_| ComponentError::NonPhysical { what })?;
    Ok(())
}

/// Reject values outside `[min, max]` with a descriptive range error.
pub fn check_range(value: f64, min: f64, max: f64, what: &'static str) -> ComponentResult<f64> {
    check_finite(value, what)?;
    if value < min || value > max {
        return Err(ComponentError::OutOfRange {
            what,
            value,
            min,
            max,
        });
    }
    Ok(value)
}

/// Positive part, `max(0, v)`.
#[inline]
pub fn pos(v: f64) -> f64 {
    v.max(0.0)
}

/// Negative part as a positive number, `max(0, -v)`.
#[inline]
pub fn neg(v: f64) -> f64 {
    (-v).max(0.0)
}
