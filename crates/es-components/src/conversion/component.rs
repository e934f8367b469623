//! Energy-conversion component: parameters, state and the control entry points.

use super::accounting::{BalanceCheck, balance_residual, calc_state_change};
use super::parameter::EccParameter;
use super::ramp::calc_p_change;
use super::state::EccState;
use crate::common::{check_finite, check_range};
use crate::error::{ComponentError, ComponentResult};
use crate::traits::EnergyComponent;
use es_core::numeric::{Tolerances, nearly_equal};
use es_core::units::{Time, as_minutes, minutes};

/// Default iteration cap of the stationary solver.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Interpretation of the control value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlKind {
    /// Normalized output target
    #[default]
    Target,
    /// Change relative to the current output (not supported)
    Difference,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlOptions {
    /// Evaluate only; the component state is left untouched
    pub hypothetical: bool,
    pub kind: ControlKind,
    /// Control values below are clamped
    pub lim_min: f64,
    /// Control values above are clamped (may exceed 1 for overload operation)
    pub lim_max: f64,
}

impl Default for ControlOptions {
    fn default() -> Self {
        Self {
            hypothetical: false,
            kind: ControlKind::Target,
            lim_min: 0.0,
            lim_max: 1.0,
        }
    }
}

impl ControlOptions {
    pub fn hypothetical() -> Self {
        Self {
            hypothetical: true,
            ..Self::default()
        }
    }

    pub fn with_limits(mut self, lim_min: f64, lim_max: f64) -> Self {
        self.lim_min = lim_min;
        self.lim_max = lim_max;
        self
    }
}

/// Conversion component (fuel cell, electrolyzer, cracker, boiler, ...).
///
/// Each call advances the component by one fixed timestep. The initial state is
/// kept so the component can be reset between runs.
#[derive(Debug, Clone)]
pub struct EnergyConversionComponent {
    par: EccParameter,
    ts: f64,
    state: EccState,
    state_initial: EccState,
    balance: BalanceCheck,
}

impl EnergyConversionComponent {
    /// Create a component with timestep `ts`, cold unless `initial` is given.
    pub fn new(par: EccParameter, ts: Time, initial: Option<EccState>) -> ComponentResult<Self> {
        let ts = as_minutes(ts);
        if !(ts.is_finite() && ts > 0.0) {
            return Err(ComponentError::config(
                par.name(),
                format!("timestep must be positive, got {ts} min"),
            ));
        }
        let state = initial.unwrap_or_default();
        state.validate(&par)?;
        Ok(Self {
            par,
            ts,
            state_initial: state.clone(),
            state,
            balance: BalanceCheck::default(),
        })
    }

    pub fn with_balance_check(mut self, balance: BalanceCheck) -> Self {
        self.balance = balance;
        self
    }

    pub fn par(&self) -> &EccParameter {
        &self.par
    }

    pub fn state(&self) -> &EccState {
        &self.state
    }

    pub fn state_initial(&self) -> &EccState {
        &self.state_initial
    }

    pub fn timestep(&self) -> Time {
        minutes(self.ts)
    }

    /// Timestep in minutes.
    pub fn ts(&self) -> f64 {
        self.ts
    }

    /// Relative output target for a control value, after clamping and denormalizing.
    pub fn target_for_control(&self, value: f64, opts: &ControlOptions) -> ComponentResult<f64> {
        if opts.kind == ControlKind::Difference {
            return Err(ComponentError::NotSupported {
                what: "difference control",
            });
        }
        if !(opts.lim_min < opts.lim_max) {
            return Err(ComponentError::InvalidArg {
                what: "control limits must satisfy lim_min < lim_max",
            });
        }
        check_finite(value, "control value")?;

        let clamped = value.clamp(opts.lim_min, opts.lim_max);
        if clamped != value {
            tracing::warn!(
                component = self.par.name(),
                value,
                clamped,
                "control value out of range"
            );
        }
        Ok(self.par.norm_range().denorm(clamped))
    }

    /// Evaluate one step from the current state without changing it.
    pub fn step(&self, value: f64, opts: &ControlOptions) -> ComponentResult<EccState> {
        let target = self.target_for_control(value, opts)?;
        let par = &self.par;
        let s0 = &self.state;

        let ramp = calc_p_change(par, s0.heatup, s0.p_out, self.ts, target);
        let flows = calc_state_change(par, s0.heatup, &ramp, self.ts);
        let e_balance = balance_residual(par, &flows, s0.heatup, &ramp);

        let e_in_check = flows.split_residual_energy();
        let p_in_check = flows.split_residual_power();
        tracing::trace!(
            component = par.name(),
            regime = ?ramp.regime,
            p_rel = ramp.p_rel_1,
            heatup = ramp.heatup_1,
            t_op = ramp.t_op,
            e_balance,
            "step"
        );
        self.balance.check(par.name(), "E_in split", e_in_check)?;
        self.balance.check(par.name(), "P_in split", p_in_check)?;
        self.balance.check(par.name(), "E_balance", e_balance)?;

        let (eta, eta_mc) = if ramp.heatup_1 >= 1.0 {
            (par.eta_at(ramp.p_rel_1), par.eta_mc_at(ramp.p_rel_1))
        } else {
            (0.0, 0.0)
        };
        let fact = par.fact_p_heat_p_loss();

        let mut state = EccState {
            heatup: ramp.heatup_1,
            p_out: flows.p_out,
            e_out: flows.e_out,
            p_in: flows.p_in,
            e_in: flows.e_in,
            p_in_mc: flows.p_in_mc,
            e_in_mc: flows.e_in_mc,
            p_in_sd1: flows.p_in_sd1,
            e_in_sd1: flows.e_in_sd1,
            p_in_sd2: flows.p_in_sd2,
            e_in_sd2: flows.e_in_sd2,
            p_loss: flows.p_loss,
            e_loss: flows.e_loss,
            p_heat: fact * flows.p_loss,
            e_heat: fact * flows.e_loss,
            eta,
            eta_mc,
            e_balance,
            soh: s0.soh,
            opex_eur: s0.opex_eur,
            ..EccState::cold()
        };
        state.set_bulk(par, ramp.p_rel_1);
        Ok(state)
    }

    /// Apply a control value for one timestep.
    ///
    /// Hypothetical evaluations return the would-be state and leave the component
    /// untouched; otherwise the new state is committed and `None` returned.
    pub fn apply_control(
        &mut self,
        value: f64,
        opts: &ControlOptions,
    ) -> ComponentResult<Option<EccState>> {
        let next = self.step(value, opts)?;
        if opts.hypothetical {
            return Ok(Some(next));
        }
        self.state = next;
        Ok(None)
    }

    /// Commit one step towards `value` with default options.
    pub fn apply_target(&mut self, value: f64) -> ComponentResult<()> {
        self.apply_control(value, &ControlOptions::default())?;
        Ok(())
    }

    /// Repeat `value` until output and input settle, then apply it once more.
    ///
    /// Converged means the output equals the effective target (the target itself at
    /// or above minimum load, zero below) while heatup and `E_in` equal those of the
    /// previous step. Returns the number of iterations used.
    pub fn apply_control_stationary(
        &mut self,
        value: f64,
        max_iterations: usize,
    ) -> ComponentResult<usize> {
        let opts = ControlOptions::default();
        let target = self.target_for_control(value, &opts)?;
        let expected = if target >= self.par.p_out_min_rel() {
            target * self.par.p_out_rated()
        } else {
            0.0
        };
        let tol = Tolerances::default();

        let mut iterations = 0;
        let mut converged = false;
        while iterations < max_iterations {
            let (heatup_prev, e_in_prev) = (self.state.heatup, self.state.e_in);
            self.apply_control(value, &opts)?;
            iterations += 1;
            if nearly_equal(self.state.p_out, expected, tol)
                && nearly_equal(self.state.heatup, heatup_prev, tol)
                && nearly_equal(self.state.e_in, e_in_prev, tol)
            {
                converged = true;
                break;
            }
        }
        self.apply_control(value, &opts)?;

        if !converged {
            tracing::warn!(
                component = self.par.name(),
                value,
                iterations,
                "stationary operation not reached"
            );
            return Err(ComponentError::ConvergenceFailed {
                what: "stationary operation",
                iterations,
            });
        }
        tracing::debug!(component = self.par.name(), value, iterations, "stationary");
        Ok(iterations)
    }

    /// Relative output target that draws `p_in_mc` [kW] on the main-conversion path.
    pub fn target_for_p_in_mc(&self, p_in_mc: f64) -> ComponentResult<f64> {
        let p = check_range(
            p_in_mc,
            self.par.p_in_mc_min(),
            self.par.p_in_mc_max(),
            "P_in_mc",
        )?;
        Ok(p * self.par.eta_mc_at_input(p) / self.par.p_out_rated())
    }

    /// Relative output target that draws `p_in` [kW] in total.
    pub fn target_for_p_in(&self, p_in: f64) -> ComponentResult<f64> {
        let p = check_range(p_in, self.par.p_in_min(), self.par.p_in_max(), "P_in")?;
        Ok(p * self.par.eta_at_input(p) / self.par.p_out_rated())
    }

    /// Main-conversion input [kW] needed for stationary output `p_out` [kW].
    pub fn p_in_mc_from_p_out(&self, p_out: f64) -> ComponentResult<f64> {
        let p = check_range(
            p_out,
            self.par.p_out_min(),
            self.par.p_out_rated(),
            "P_out",
        )?;
        Ok(p / self.par.eta_mc_at(p / self.par.p_out_rated()))
    }

    /// Total input [kW] needed for stationary output `p_out` [kW].
    pub fn p_in_from_p_out(&self, p_out: f64) -> ComponentResult<f64> {
        let p = check_range(
            p_out,
            self.par.p_out_min(),
            self.par.p_out_rated(),
            "P_out",
        )?;
        Ok(p / self.par.eta_at(p / self.par.p_out_rated()))
    }

    /// Restore the state captured at construction.
    pub fn reset_state(&mut self) {
        self.state = self.state_initial.clone();
    }
}

impl EnergyComponent for EnergyConversionComponent {
    type State = EccState;

    fn name(&self) -> &str {
        self.par.name()
    }

    fn timestep(&self) -> Time {
        minutes(self.ts)
    }

    fn state(&self) -> &EccState {
        &self.state
    }

    fn apply(&mut self, control: f64) -> ComponentResult<()> {
        self.apply_target(control)
    }

    fn reset(&mut self) {
        self.reset_state();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::CarrierSet;
    use crate::conversion::parameter::fixtures::{sofc, sofc_def};
    use crate::traits::FlatRecord;

    fn cold_sofc() -> EnergyConversionComponent {
        EnergyConversionComponent::new(sofc(), minutes(1.0), None)
            .unwrap()
            .with_balance_check(BalanceCheck::strict())
    }

    #[test]
    fn rejects_bad_timestep() {
        assert!(EnergyConversionComponent::new(sofc(), minutes(0.0), None).is_err());
        assert!(EnergyConversionComponent::new(sofc(), minutes(-1.0), None).is_err());
    }

    #[test]
    fn rejects_invalid_initial_state() {
        let bad = EccState {
            heatup: 0.3,
            p_out: 50.0,
            ..EccState::cold()
        };
        assert!(EnergyConversionComponent::new(sofc(), minutes(1.0), Some(bad)).is_err());
    }

    #[test]
    fn first_step_from_cold() {
        let mut c = cold_sofc();
        c.apply_target(1.0).unwrap();
        let s = c.state();
        assert!((s.heatup - 0.1).abs() < 1e-12);
        assert_eq!(s.p_out, 0.0);
        assert_eq!(s.eta, 0.0);
        assert_eq!(s.eta_mc, 0.0);
        assert!((s.e_in - 1.0).abs() < 1e-12);
        assert!((s.e_heat - s.e_loss).abs() < 1e-15);
        assert!((s.e_bulk_heatup - 0.5).abs() < 1e-12);
    }

    #[test]
    fn hypothetical_step_leaves_state() {
        let mut c = cold_sofc();
        let before = c.state().clone();
        let next = c
            .apply_control(1.0, &ControlOptions::hypothetical())
            .unwrap()
            .unwrap();
        assert!(next.heatup > 0.0);
        assert_eq!(c.state(), &before);
    }

    #[test]
    fn difference_control_is_not_supported() {
        let mut c = cold_sofc();
        let opts = ControlOptions {
            kind: ControlKind::Difference,
            ..ControlOptions::default()
        };
        assert!(matches!(
            c.apply_control(0.5, &opts),
            Err(ComponentError::NotSupported { .. })
        ));
    }

    #[test]
    fn out_of_range_control_is_clamped() {
        let c = cold_sofc();
        let opts = ControlOptions::default();
        assert_eq!(c.target_for_control(1.7, &opts).unwrap(), 1.0);
        assert_eq!(c.target_for_control(-0.5, &opts).unwrap(), 0.0);
        let overload = opts.with_limits(0.0, 1.2);
        assert!((c.target_for_control(1.1, &overload).unwrap() - 1.1).abs() < 1e-12);
        assert!(c.target_for_control(f64::NAN, &opts).is_err());
        assert!(c.target_for_control(0.5, &opts.with_limits(1.0, 0.0)).is_err());
    }

    #[test]
    fn norm_limits_rescale_control() {
        let mut def = sofc_def();
        def.norm_limits = [0.0, 100.0];
        let par = EccParameter::new(def, CarrierSet::default()).unwrap();
        let c = EnergyConversionComponent::new(par, minutes(1.0), None).unwrap();
        let opts = ControlOptions::default().with_limits(0.0, 100.0);
        assert!((c.target_for_control(50.0, &opts).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn stationary_from_operating_point() {
        let par = sofc();
        let initial = EccState::operating(&par, 0.5).unwrap();
        let mut c = EnergyConversionComponent::new(par, minutes(1.0), Some(initial)).unwrap();
        let iterations = c
            .apply_control_stationary(0.5, DEFAULT_MAX_ITERATIONS)
            .unwrap();
        assert!(iterations <= 2);
        assert!((c.state().p_out - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn stationary_fails_when_capped() {
        let mut c = cold_sofc();
        let err = c.apply_control_stationary(1.0, 3).unwrap_err();
        assert!(matches!(
            err,
            ComponentError::ConvergenceFailed { iterations: 3, .. }
        ));
    }

    #[test]
    fn inverse_lookups() {
        let c = cold_sofc();
        let par = c.par();
        let target = c.target_for_p_in_mc(par.p_in_mc_max()).unwrap();
        assert!((target - 1.0).abs() < 1e-9);
        // the input-power table is linear in P_in, not in P_out
        let p_in_mc = c.p_in_mc_from_p_out(1000.0).unwrap();
        let back = c.target_for_p_in_mc(p_in_mc).unwrap();
        assert!((back - 0.5).abs() < 1e-3);
        let p_in = c.p_in_from_p_out(2000.0).unwrap();
        assert!((p_in - 2000.0 / 0.91).abs() < 1e-9);
        assert!((c.target_for_p_in(p_in).unwrap() - 1.0).abs() < 1e-9);

        assert!(matches!(
            c.target_for_p_in_mc(1.0),
            Err(ComponentError::OutOfRange { .. })
        ));
        assert!(c.p_in_mc_from_p_out(100.0).is_err());
        assert!(c.p_in_mc_from_p_out(2500.0).is_err());
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut c = cold_sofc();
        for _ in 0..20 {
            c.apply_target(1.0).unwrap();
        }
        assert_ne!(c.state(), c.state_initial());
        c.reset_state();
        assert_eq!(c.state(), &EccState::cold());
    }

    #[test]
    fn trait_record_matches_state() {
        let mut c = cold_sofc();
        EnergyComponent::apply(&mut c, 1.0).unwrap();
        let record = EnergyComponent::record(&c);
        assert_eq!(record.len(), EccState::field_names().len());
        assert!((record[0].1 - 0.1).abs() < 1e-12);
    }
}
