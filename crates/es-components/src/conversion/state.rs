//! Operating state of an energy-conversion component.

use super::parameter::EccParameter;
use crate::common::EPSILON_REL;
use crate::error::{ComponentError, ComponentResult};
use crate::traits::FlatRecord;
use serde::{Deserialize, Serialize};

/// Snapshot of a conversion component after one timestep.
///
/// Powers [kW] are rates at the end of the step, energies [kWh] integrals over the
/// step. A state is never edited in place: every committing step replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EccState {
    /// 0 = cold, 1 = at operating temperature (minimum load reachable)
    pub heatup: f64,

    pub p_out: f64,
    pub e_out: f64,
    pub p_in: f64,
    pub e_in: f64,
    pub p_in_mc: f64,
    pub e_in_mc: f64,
    pub p_in_sd1: f64,
    pub e_in_sd1: f64,
    pub p_in_sd2: f64,
    pub e_in_sd2: f64,
    pub p_loss: f64,
    pub e_loss: f64,
    pub p_heat: f64,
    pub e_heat: f64,

    pub eta: f64,
    pub eta_mc: f64,

    pub e_bulk: f64,
    pub e_bulk_heatup: f64,
    pub e_bulk_op: f64,
    /// Residual of the energy balance over the last step
    pub e_balance: f64,

    /// State of health, carried through unchanged
    pub soh: f64,
    /// Operating expenses, carried through unchanged
    pub opex_eur: f64,
}

impl Default for EccState {
    fn default() -> Self {
        Self::cold()
    }
}

impl EccState {
    /// Cold, switched-off component.
    pub fn cold() -> Self {
        Self {
            heatup: 0.0,
            p_out: 0.0,
            e_out: 0.0,
            p_in: 0.0,
            e_in: 0.0,
            p_in_mc: 0.0,
            e_in_mc: 0.0,
            p_in_sd1: 0.0,
            e_in_sd1: 0.0,
            p_in_sd2: 0.0,
            e_in_sd2: 0.0,
            p_loss: 0.0,
            e_loss: 0.0,
            p_heat: 0.0,
            e_heat: 0.0,
            eta: 0.0,
            eta_mc: 0.0,
            e_bulk: 0.0,
            e_bulk_heatup: 0.0,
            e_bulk_op: 0.0,
            e_balance: 0.0,
            soh: 1.0,
            opex_eur: 0.0,
        }
    }

    /// Warm component running stationary at relative output `p_rel`.
    ///
    /// Powers describe the stationary load point; energies are zero because no step
    /// has been taken yet.
    pub fn operating(par: &EccParameter, p_rel: f64) -> ComponentResult<Self> {
        let m = par.p_out_min_rel();
        let max = par.p_rel_max();
        if !(p_rel >= m && p_rel <= max) {
            return Err(ComponentError::OutOfRange {
                what: "operating point",
                value: p_rel,
                min: m,
                max,
            });
        }

        let eta = par.eta_at(p_rel);
        let eta_mc = par.eta_mc_at(p_rel);
        let p_out = p_rel * par.p_out_rated();
        let p_in = p_out / eta;
        let p_in_mc = p_out / eta_mc;
        let p_sd = p_in - p_in_mc;
        let p_loss = p_in - p_out;

        let mut state = Self {
            heatup: 1.0,
            p_out,
            p_in,
            p_in_mc,
            p_in_sd1: par.split_p_sd1() * p_sd,
            p_in_sd2: par.split_p_sd2() * p_sd,
            p_loss,
            p_heat: par.fact_p_heat_p_loss() * p_loss,
            eta,
            eta_mc,
            ..Self::cold()
        };
        state.set_bulk(par, p_rel);
        Ok(state)
    }

    /// Whether the component is in load operation.
    pub fn is_operating(&self) -> bool {
        self.heatup >= 1.0
    }

    /// Relative output used as the ramp starting point.
    ///
    /// Below operating temperature the component sits on a virtual power axis
    /// `heatup * p_out_min_rel`.
    pub fn p_rel(&self, par: &EccParameter) -> f64 {
        let m = par.p_out_min_rel();
        if self.is_operating() {
            (self.p_out / par.p_out_rated()).max(m)
        } else {
            self.heatup * m
        }
    }

    pub(crate) fn set_bulk(&mut self, par: &EccParameter, p_rel: f64) {
        self.e_bulk_heatup = par.bulk_heatup(self.heatup);
        self.e_bulk_op = par.bulk_op(p_rel);
        self.e_bulk = self.e_bulk_heatup + self.e_bulk_op;
    }

    /// Check a user supplied state against the component envelope.
    pub fn validate(&self, par: &EccParameter) -> ComponentResult<()> {
        let invalid = |what: String| Err(ComponentError::config(par.name(), what));

        if let Some((field, value)) = self
            .to_pairs()
            .into_iter()
            .find(|(_, v)| !v.is_finite())
        {
            return invalid(format!("initial state field {field} is {value}"));
        }
        if !(0.0..=1.0).contains(&self.heatup) {
            return invalid(format!(
                "initial heatup must lie in [0, 1], got {}",
                self.heatup
            ));
        }
        if self.is_operating() {
            let p_rel = self.p_out / par.p_out_rated();
            let (min, max) = (par.p_out_min_rel(), par.p_rel_max());
            if p_rel < min - EPSILON_REL || p_rel > max + EPSILON_REL {
                return invalid(format!(
                    "initial output {} kW outside operating envelope [{}, {}] kW",
                    self.p_out,
                    min * par.p_out_rated(),
                    max * par.p_out_rated()
                ));
            }
        } else if self.p_out.abs() > EPSILON_REL {
            return invalid(format!(
                "initial output {} kW requires heatup 1, got {}",
                self.p_out, self.heatup
            ));
        }
        Ok(())
    }
}

const FIELDS: &[&str] = &[
    "heatup",
    "P_out",
    "E_out",
    "P_in",
    "E_in",
    "P_in_mc",
    "E_in_mc",
    "P_in_sd1",
    "E_in_sd1",
    "P_in_sd2",
    "E_in_sd2",
    "P_loss",
    "E_loss",
    "P_heat",
    "E_heat",
    "eta",
    "eta_mc",
    "E_bulk",
    "E_bulk_heatup",
    "E_bulk_op",
    "E_balance",
    "SoH",
    "opex_Eur",
];

impl FlatRecord for EccState {
    fn field_names() -> &'static [&'static str] {
        FIELDS
    }

    fn field_values(&self) -> Vec<f64> {
        vec![
            self.heatup,
            self.p_out,
            self.e_out,
            self.p_in,
            self.e_in,
            self.p_in_mc,
            self.e_in_mc,
            self.p_in_sd1,
            self.e_in_sd1,
            self.p_in_sd2,
            self.e_in_sd2,
            self.p_loss,
            self.e_loss,
            self.p_heat,
            self.e_heat,
            self.eta,
            self.eta_mc,
            self.e_bulk,
            self.e_bulk_heatup,
            self.e_bulk_op,
            self.e_balance,
            self.soh,
            self.opex_eur,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::parameter::fixtures::sofc;

    #[test]
    fn cold_state_is_default() {
        let s = EccState::default();
        assert_eq!(s.heatup, 0.0);
        assert_eq!(s.p_out, 0.0);
        assert_eq!(s.soh, 1.0);
        assert!(!s.is_operating());
    }

    #[test]
    fn operating_state_at_full_load() {
        let par = sofc();
        let s = EccState::operating(&par, 1.0).unwrap();
        assert!(s.is_operating());
        assert!((s.p_out - 2000.0).abs() < 1e-9);
        assert!((s.p_in - 2000.0 / 0.91).abs() < 1e-9);
        assert!((s.p_in - s.p_in_mc - s.p_in_sd1 - s.p_in_sd2).abs() < 1e-9);
        assert!((s.e_bulk - 25.0).abs() < 1e-9);
        assert!(s.validate(&par).is_ok());
    }

    #[test]
    fn operating_state_below_minimum_is_rejected() {
        let par = sofc();
        assert!(matches!(
            EccState::operating(&par, 0.1),
            Err(ComponentError::OutOfRange { .. })
        ));
    }

    #[test]
    fn ramp_start_point() {
        let par = sofc();
        let half_warm = EccState {
            heatup: 0.5,
            ..EccState::cold()
        };
        assert!((half_warm.p_rel(&par) - 0.075).abs() < 1e-15);

        let warm_idle = EccState {
            heatup: 1.0,
            ..EccState::cold()
        };
        assert_eq!(warm_idle.p_rel(&par), 0.15);
    }

    #[test]
    fn validate_rejects_inconsistent_states() {
        let par = sofc();
        let output_while_cold = EccState {
            heatup: 0.5,
            p_out: 100.0,
            ..EccState::cold()
        };
        assert!(output_while_cold.validate(&par).is_err());

        let overheated = EccState {
            heatup: 1.5,
            ..EccState::cold()
        };
        assert!(overheated.validate(&par).is_err());

        let below_minimum = EccState {
            heatup: 1.0,
            p_out: 100.0,
            ..EccState::cold()
        };
        assert!(below_minimum.validate(&par).is_err());

        let nan = EccState {
            e_in: f64::NAN,
            ..EccState::cold()
        };
        assert!(nan.validate(&par).is_err());
    }

    #[test]
    fn flat_record_lines_up() {
        let s = EccState::cold();
        let pairs = s.to_pairs();
        assert_eq!(pairs.len(), EccState::field_names().len());
        assert_eq!(pairs[0], ("heatup", 0.0));
        assert_eq!(pairs.last().unwrap(), &("opex_Eur", 0.0));
    }
}
