//! Energy-storage component (battery-like).
//!
//! Sign convention of the control value: positive requests charge the storage,
//! negative requests discharge it. Losses occur on charging only.

use crate::carrier::CarrierSet;
use crate::common::check_finite;
use crate::conversion::TechnoEconomic;
use crate::error::{ComponentError, ComponentResult};
use crate::traits::{EnergyComponent, FlatRecord};
use es_core::numeric::mean_kw;
use es_core::units::{Time, as_minutes, minutes};
use serde::{Deserialize, Serialize};

/// Content tolerance [kWh] before a request counts as over- or underflow.
const CONTENT_TOL: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscParameterDef {
    pub name: String,
    /// Capacity [kWh]
    pub e_cap: f64,
    /// Charging efficiency
    pub eta: f64,
    /// Power limit as multiple of capacity [1/h]; 0 disables the limit
    #[serde(default)]
    pub c_rate: f64,
    /// Grow capacity instead of failing on over- or underflow
    #[serde(default)]
    pub auto_increase: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub techno_economic: Option<TechnoEconomic>,
}

/// Validated storage parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct EscParameter {
    def: EscParameterDef,
    carriers: CarrierSet,
}

impl EscParameter {
    pub fn new(def: EscParameterDef, carriers: CarrierSet) -> ComponentResult<Self> {
        let name = def.name.as_str();
        if !(def.e_cap.is_finite() && def.e_cap >= 0.0) {
            return Err(ComponentError::config(
                name,
                format!("e_cap must be finite and non-negative, got {}", def.e_cap),
            ));
        }
        if def.e_cap == 0.0 && !def.auto_increase {
            return Err(ComponentError::config(
                name,
                "zero capacity requires auto_increase",
            ));
        }
        if !(def.eta > 0.0 && def.eta <= 1.0) {
            return Err(ComponentError::config(
                name,
                format!("eta must lie in (0, 1], got {}", def.eta),
            ));
        }
        if !(def.c_rate.is_finite() && def.c_rate >= 0.0) {
            return Err(ComponentError::config(
                name,
                format!("c_rate must be finite and non-negative, got {}", def.c_rate),
            ));
        }
        Ok(Self { def, carriers })
    }

    pub fn def(&self) -> &EscParameterDef {
        &self.def
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn carriers(&self) -> &CarrierSet {
        &self.carriers
    }

    pub fn e_cap(&self) -> f64 {
        self.def.e_cap
    }

    pub fn eta(&self) -> f64 {
        self.def.eta
    }

    pub fn c_rate(&self) -> f64 {
        self.def.c_rate
    }

    pub fn auto_increase(&self) -> bool {
        self.def.auto_increase
    }

    pub fn techno_economic(&self) -> Option<&TechnoEconomic> {
        self.def.techno_economic.as_ref()
    }
}

/// Capacity owned by one storage instance.
///
/// Starts at the parameter capacity and only grows through auto-increase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityCell {
    initial: f64,
    current: f64,
}

impl CapacityCell {
    pub fn new(initial: f64) -> Self {
        Self {
            initial,
            current: initial,
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    /// Growth since construction or the last reset.
    pub fn increase(&self) -> f64 {
        self.current - self.initial
    }

    pub fn grow(&mut self, by: f64) {
        self.current += by;
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// Storage state after one timestep.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EscState {
    /// Relative content, `content / e_cap`
    pub soc: f64,
    pub e_in: f64,
    pub e_out: f64,
    pub e_loss: f64,
    /// Change of content (negative when discharging)
    pub e_charge: f64,
    pub p_in: f64,
    pub p_out: f64,
    pub p_loss: f64,
    /// Current capacity [kWh]
    pub e_cap: f64,
    /// Capacity added by auto-increase [kWh]
    pub e_cap_incr: f64,
}

impl EscState {
    pub fn with_soc(capacity: f64, soc: f64) -> Self {
        Self {
            soc,
            e_cap: capacity,
            ..Self::default()
        }
    }

    /// Absolute content [kWh].
    pub fn content(&self) -> f64 {
        self.soc * self.e_cap
    }
}

const FIELDS: &[&str] = &[
    "SoC", "E_in", "E_out", "E_loss", "E_charge", "P_in", "P_out", "P_loss", "E_cap",
    "E_cap_incr",
];

impl FlatRecord for EscState {
    fn field_names() -> &'static [&'static str] {
        FIELDS
    }

    fn field_values(&self) -> Vec<f64> {
        vec![
            self.soc,
            self.e_in,
            self.e_out,
            self.e_loss,
            self.e_charge,
            self.p_in,
            self.p_out,
            self.p_loss,
            self.e_cap,
            self.e_cap_incr,
        ]
    }
}

#[derive(Debug, Clone)]
pub struct EnergyStorageComponent {
    par: EscParameter,
    ts: f64,
    capacity: CapacityCell,
    state: EscState,
    state_initial: EscState,
}

impl EnergyStorageComponent {
    pub fn new(par: EscParameter, ts: Time, soc: f64) -> ComponentResult<Self> {
        let ts = as_minutes(ts);
        if !(ts.is_finite() && ts > 0.0) {
            return Err(ComponentError::config(
                par.name(),
                format!("timestep must be positive, got {ts} min"),
            ));
        }
        if !(0.0..=1.0).contains(&soc) {
            return Err(ComponentError::config(
                par.name(),
                format!("initial SoC must lie in [0, 1], got {soc}"),
            ));
        }
        let capacity = CapacityCell::new(par.e_cap());
        let state = EscState::with_soc(capacity.current(), soc);
        Ok(Self {
            par,
            ts,
            capacity,
            state_initial: state.clone(),
            state,
        })
    }

    pub fn par(&self) -> &EscParameter {
        &self.par
    }

    pub fn state(&self) -> &EscState {
        &self.state
    }

    pub fn state_initial(&self) -> &EscState {
        &self.state_initial
    }

    pub fn capacity(&self) -> &CapacityCell {
        &self.capacity
    }

    pub fn ts(&self) -> f64 {
        self.ts
    }

    /// Evaluate a request without committing it; returns the state and the capacity
    /// the storage would have afterwards.
    pub fn step(&self, e_req: f64) -> ComponentResult<(EscState, f64)> {
        check_finite(e_req, "requested storage energy")?;
        let par = &self.par;
        let cap_0 = self.capacity.current();

        if par.c_rate() > 0.0 {
            let limit = par.c_rate() * cap_0;
            let power = mean_kw(e_req.abs(), self.ts);
            if power > limit * (1.0 + 1e-12) {
                return Err(ComponentError::PowerLimit {
                    what: "storage power",
                    value: power,
                    limit,
                });
            }
        }

        let (e_in, e_out, e_loss, e_charge) = if e_req > 0.0 {
            (e_req, 0.0, (1.0 - par.eta()) * e_req, par.eta() * e_req)
        } else {
            (0.0, -e_req, 0.0, e_req)
        };

        let mut cap_1 = cap_0;
        let mut content = self.state.soc * cap_0 + e_charge;
        if content > cap_0 + CONTENT_TOL {
            if !par.auto_increase() {
                return Err(ComponentError::StorageOverflow {
                    name: par.name().to_string(),
                    content,
                    capacity: cap_0,
                });
            }
            cap_1 = content;
        } else if content < -CONTENT_TOL {
            if !par.auto_increase() {
                return Err(ComponentError::StorageOverflow {
                    name: par.name().to_string(),
                    content,
                    capacity: cap_0,
                });
            }
            // added capacity counts as pre-filled, so the content ends at zero
            cap_1 = cap_0 - content;
            content = 0.0;
        }
        let content = content.clamp(0.0, cap_1);
        let soc = if cap_1 > 0.0 { content / cap_1 } else { 0.0 };

        let state = EscState {
            soc,
            e_in,
            e_out,
            e_loss,
            e_charge,
            p_in: mean_kw(e_in, self.ts),
            p_out: mean_kw(e_out, self.ts),
            p_loss: mean_kw(e_loss, self.ts),
            e_cap: cap_1,
            e_cap_incr: cap_1 - self.par.e_cap(),
        };
        Ok((state, cap_1))
    }

    /// Charge (`e_req > 0`) or discharge (`e_req <= 0`) for one timestep.
    pub fn apply_control(&mut self, e_req: f64) -> ComponentResult<()> {
        let (state, cap) = self.step(e_req)?;
        let growth = cap - self.capacity.current();
        if growth > 0.0 {
            tracing::info!(
                storage = self.par.name(),
                growth,
                capacity = cap,
                "storage capacity increased"
            );
            self.capacity.grow(growth);
        }
        self.state = state;
        Ok(())
    }

    /// Restore the initial state, optionally keeping the grown capacity.
    pub fn reset_state(&mut self, reset_capacity: bool) {
        self.state = self.state_initial.clone();
        if reset_capacity {
            self.capacity.reset();
        } else {
            self.state.e_cap = self.capacity.current();
            self.state.e_cap_incr = self.capacity.increase();
        }
    }
}

impl EnergyComponent for EnergyStorageComponent {
    type State = EscState;

    fn name(&self) -> &str {
        self.par.name()
    }

    fn timestep(&self) -> Time {
        minutes(self.ts)
    }

    fn state(&self) -> &EscState {
        &self.state
    }

    fn apply(&mut self, control: f64) -> ComponentResult<()> {
        self.apply_control(control)
    }

    fn reset(&mut self) {
        self.reset_state(true);
    }
}
