use crate::EsError;

/// Floating point type used throughout system
pub type Real = f64;

/// Minutes per hour, for kW <-> kWh conversions over timesteps given in minutes.
pub const MIN_PER_H: Real = 60.0;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, EsError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(EsError::NonFinite { what, value: v })
    }
}

/// Energy in kWh delivered by a constant power (kW) over `minutes`.
#[inline]
pub fn kwh_over(power_kw: Real, minutes: Real) -> Real {
    power_kw * minutes / MIN_PER_H
}

/// Mean power in kW of `energy_kwh` spread over `minutes`.
///
/// Zero-duration intervals carry no rate and return 0.
#[inline]
pub fn mean_kw(energy_kwh: Real, minutes: Real) -> Real {
    if minutes > 0.0 {
        energy_kwh * MIN_PER_H / minutes
    } else {
        0.0
    }
}

/// Linear range mapping used for control values.
///
/// `norm` maps a real value from `real` onto `normalized`; `denorm` is its inverse.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormRange {
    pub normalized: [Real; 2],
    pub real: [Real; 2],
}

impl NormRange {
    pub fn new(normalized: [Real; 2], real: [Real; 2]) -> Result<Self, EsError> {
        if normalized[1] == normalized[0] {
            return Err(EsError::InvalidArg {
                what: "normalized range must not be empty",
            });
        }
        if real[1] == real[0] {
            return Err(EsError::InvalidArg {
                what: "real range must not be empty",
            });
        }
        Ok(Self { normalized, real })
    }

    pub fn norm(&self, val_r: Real) -> Real {
        let [n0, n1] = self.normalized;
        let [r0, r1] = self.real;
        (n1 - n0) * (val_r - r0) / (r1 - r0) + n0
    }

    pub fn denorm(&self, val_n: Real) -> Real {
        let [n0, n1] = self.normalized;
        let [r0, r1] = self.real;
        (val_n - n0) / (n1 - n0) * (r1 - r0) + r0
    }
}
