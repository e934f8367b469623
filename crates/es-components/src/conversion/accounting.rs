//! Energy accounting for one timestep.
//!
//! A step is classified by whether the component is in load operation at its start
//! and at its end. Pure standby (NL→NL) and pure load (L→L) intervals have their own
//! models; mixed transitions are the sum of an L→L and an NL→NL sub-interval, split
//! at the time the minimum-load boundary is crossed.
//!
//! Bulk energy is the energy the component holds internally: the heatup reservoir
//! (`heatup * e_start_bulk`) plus the load-dependent part from the load-change curve.
//! Every step satisfies `E_in - E_out - E_loss = ΔE_bulk`.

use super::flows::FlowRecord;
use super::parameter::EccParameter;
use super::ramp::Ramp;
use crate::common::{DEFAULT_BALANCE_TOL, neg, pos};
use crate::error::{ComponentError, ComponentResult};
use es_core::numeric::{kwh_over, mean_kw};

/// Operating-mode change over a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    NoLoadToNoLoad,
    LoadToLoad,
    LoadToNoLoad,
    NoLoadToLoad,
}

impl Transition {
    pub fn classify(heatup_0: f64, heatup_1: f64) -> Self {
        match (heatup_0 >= 1.0, heatup_1 >= 1.0) {
            (false, false) => Transition::NoLoadToNoLoad,
            (true, true) => Transition::LoadToLoad,
            (true, false) => Transition::LoadToNoLoad,
            (false, true) => Transition::NoLoadToLoad,
        }
    }
}

/// How standby heating compensates the passive cooldown within an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compensation {
    /// Heating at full startup rate; cooldown never shows
    FullSpeedStartup,
    /// Heating slower than the startup rate; part of the cooldown is offset
    PartialStartup,
    /// Heatup held constant; the whole cooldown is offset
    Hold,
    /// Cooling slower than natural; the difference is offset
    SlowCooldown,
    /// Passive cooldown, nothing offset
    NaturalCooldown,
}

const FULL_SPEED_TOL: f64 = 1e-9;

/// Compensation case and amount (heatup units) for a standby move `h0 -> h1` over `tau`.
pub fn compensation(par: &EccParameter, h0: f64, h1: f64, tau: f64) -> (Compensation, f64) {
    let m = par.p_out_min_rel();
    let dh = h1 - h0;
    // passive cooldown potential, limited by what is left to lose
    let d = (par.p_change_cooldown_rel() * tau / m).min(h0).max(0.0);

    if dh > 0.0 {
        let full = par.p_change_start_rel() * tau / m;
        let r = if full > 0.0 { (dh / full).min(1.0) } else { 1.0 };
        if r >= 1.0 - FULL_SPEED_TOL {
            (Compensation::FullSpeedStartup, 0.0)
        } else {
            (Compensation::PartialStartup, (1.0 - r) * d)
        }
    } else if dh < 0.0 {
        let c = d - dh.abs();
        if c > FULL_SPEED_TOL * d {
            (Compensation::SlowCooldown, c)
        } else {
            (Compensation::NaturalCooldown, 0.0)
        }
    } else {
        (Compensation::Hold, d)
    }
}

/// Standby interval: heatup moves from `h0` to `h1` over `tau` minutes.
///
/// No main-conversion input and no output. All input enters through the secondary
/// paths and either raises the heatup reservoir or is lost.
pub fn no_load_change(par: &EccParameter, h0: f64, h1: f64, tau: f64) -> FlowRecord {
    let dh = h1 - h0;
    let (up, down) = (pos(dh), neg(dh));
    let (_, c) = compensation(par, h0, h1, tau);

    let e_in = (up + c) * par.e_start();
    let e_loss = up * par.e_start_loss() + c * par.e_start() + down * par.e_start_bulk();
    let p_in = mean_kw(e_in, tau);

    FlowRecord {
        e_in,
        e_in_mc: 0.0,
        e_in_sd1: par.split_p_sd1() * e_in,
        e_in_sd2: par.split_p_sd2() * e_in,
        e_out: 0.0,
        e_loss,
        p_in,
        p_in_mc: 0.0,
        p_in_sd1: par.split_p_sd1() * p_in,
        p_in_sd2: par.split_p_sd2() * p_in,
        p_out: 0.0,
        p_loss: mean_kw(e_loss, tau),
    }
}

/// Load interval: relative output moves linearly from `p0` to `p1` over `tau` minutes.
///
/// Energies are trapezoids of the boundary powers. A rising load-change curve draws
/// extra secondary input, a falling one releases it as loss.
pub fn load_change(par: &EccParameter, p0: f64, p1: f64, tau: f64) -> FlowRecord {
    let rated = par.p_out_rated();
    let (out_0, out_1) = (p0 * rated, p1 * rated);
    let (in_0, in_1) = (out_0 / par.eta_at(p0), out_1 / par.eta_at(p1));
    let (mc_0, mc_1) = (out_0 / par.eta_mc_at(p0), out_1 / par.eta_mc_at(p1));

    let e_out = kwh_over(0.5 * (out_0 + out_1), tau);
    let e_conv = kwh_over(0.5 * (in_0 + in_1), tau);
    let e_in_mc = kwh_over(0.5 * (mc_0 + mc_1), tau);

    let d_lc = par.e_loadchange_at(p1) - par.e_loadchange_at(p0);
    let p_lc = mean_kw(d_lc, tau);

    let e_in = e_conv + pos(d_lc);
    let e_sd = e_in - e_in_mc;
    let p_in = in_1 + pos(p_lc);
    let p_sd = p_in - mc_1;

    FlowRecord {
        e_in,
        e_in_mc,
        e_in_sd1: par.split_p_sd1() * e_sd,
        e_in_sd2: par.split_p_sd2() * e_sd,
        e_out,
        e_loss: e_conv - e_out + neg(d_lc),
        p_in,
        p_in_mc: mc_1,
        p_in_sd1: par.split_p_sd1() * p_sd,
        p_in_sd2: par.split_p_sd2() * p_sd,
        p_out: out_1,
        p_loss: in_1 - out_1 + neg(p_lc),
    }
}

/// Flows of a full step of `ts` minutes following `ramp`.
pub fn calc_state_change(par: &EccParameter, heatup_0: f64, ramp: &Ramp, ts: f64) -> FlowRecord {
    let m = par.p_out_min_rel();
    let t_op = ramp.t_op;
    match Transition::classify(heatup_0, ramp.heatup_1) {
        Transition::NoLoadToNoLoad => no_load_change(par, heatup_0, ramp.heatup_1, ts),
        Transition::LoadToLoad => load_change(par, ramp.p_rel_0, ramp.p_rel_1, t_op),
        Transition::LoadToNoLoad => {
            load_change(par, ramp.p_rel_0, m, t_op).without_power()
                + no_load_change(par, 1.0, ramp.heatup_1, ts - t_op)
        }
        Transition::NoLoadToLoad => {
            no_load_change(par, heatup_0, 1.0, ts - t_op).without_power()
                + load_change(par, m, ramp.p_rel_1, t_op)
        }
    }
}

/// Balance residual `(E_in - E_out - E_loss) - ΔE_bulk` of a step.
///
/// Bulk energies are evaluated from heatup and load point, independently of the
/// branch formulas that produced `flows`.
pub fn balance_residual(par: &EccParameter, flows: &FlowRecord, heatup_0: f64, ramp: &Ramp) -> f64 {
    let bulk_0 = par.bulk(heatup_0, ramp.p_rel_0);
    let bulk_1 = par.bulk(ramp.heatup_1, ramp.p_rel_1);
    flows.retained() - (bulk_1 - bulk_0)
}

/// Reaction to a failed split or balance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BalancePolicy {
    /// Log a warning and commit the step anyway
    #[default]
    Warn,
    /// Reject the step with [`ComponentError::BalanceViolation`]
    Strict,
}

/// Tolerance and policy for the per-step consistency checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceCheck {
    /// Absolute tolerance [kWh, kW]
    pub tolerance: f64,
    pub policy: BalancePolicy,
}

impl Default for BalanceCheck {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_BALANCE_TOL,
            policy: BalancePolicy::Warn,
        }
    }
}

impl BalanceCheck {
    pub fn strict() -> Self {
        Self {
            policy: BalancePolicy::Strict,
            ..Self::default()
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Check one residual against the tolerance.
    pub fn check(&self, component: &str, what: &'static str, residual: f64) -> ComponentResult<()> {
        if residual.abs() <= self.tolerance {
            return Ok(());
        }
        match self.policy {
            BalancePolicy::Warn => {
                tracing::warn!(
                    component,
                    check = what,
                    residual,
                    tolerance = self.tolerance,
                    "numerical inconsistency"
                );
                Ok(())
            }
            BalancePolicy::Strict => Err(ComponentError::BalanceViolation {
                what,
                residual,
                tolerance: self.tolerance,
            }),
        }
    }
}
