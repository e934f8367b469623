//! Energy and power flows of a (partial) timestep.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Flows over one interval: energies [kWh] integrated, powers [kW] at its end.
///
/// Combined transitions are the sum of their sub-intervals; `Default` is the zero
/// record.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlowRecord {
    pub e_in: f64,
    pub e_in_mc: f64,
    pub e_in_sd1: f64,
    pub e_in_sd2: f64,
    pub e_out: f64,
    pub e_loss: f64,

    pub p_in: f64,
    pub p_in_mc: f64,
    pub p_in_sd1: f64,
    pub p_in_sd2: f64,
    pub p_out: f64,
    pub p_loss: f64,
}

impl FlowRecord {
    /// Same energies, all powers zero.
    ///
    /// Used for the leading sub-interval of a combined transition, whose rates do
    /// not describe the end of the step.
    pub fn without_power(self) -> Self {
        Self {
            p_in: 0.0,
            p_in_mc: 0.0,
            p_in_sd1: 0.0,
            p_in_sd2: 0.0,
            p_out: 0.0,
            p_loss: 0.0,
            ..self
        }
    }

    /// `E_in - (E_in_mc + E_in_sd1 + E_in_sd2)`
    pub fn split_residual_energy(&self) -> f64 {
        self.e_in - (self.e_in_mc + self.e_in_sd1 + self.e_in_sd2)
    }

    /// `P_in - (P_in_mc + P_in_sd1 + P_in_sd2)`
    pub fn split_residual_power(&self) -> f64 {
        self.p_in - (self.p_in_mc + self.p_in_sd1 + self.p_in_sd2)
    }

    /// Energy retained by the component, `E_in - E_out - E_loss`.
    pub fn retained(&self) -> f64 {
        self.e_in - self.e_out - self.e_loss
    }
}

impl Add for FlowRecord {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            e_in: self.e_in + rhs.e_in,
            e_in_mc: self.e_in_mc + rhs.e_in_mc,
            e_in_sd1: self.e_in_sd1 + rhs.e_in_sd1,
            e_in_sd2: self.e_in_sd2 + rhs.e_in_sd2,
            e_out: self.e_out + rhs.e_out,
            e_loss: self.e_loss + rhs.e_loss,
            p_in: self.p_in + rhs.p_in,
            p_in_mc: self.p_in_mc + rhs.p_in_mc,
            p_in_sd1: self.p_in_sd1 + rhs.p_in_sd1,
            p_in_sd2: self.p_in_sd2 + rhs.p_in_sd2,
            p_out: self.p_out + rhs.p_out,
            p_loss: self.p_loss + rhs.p_loss,
        }
    }
}

impl AddAssign for FlowRecord {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for FlowRecord {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}
