//! Static description of an energy-conversion component.
//!
//! Construction is two-phase: the serializable [`EccParameterDef`] is validated,
//! then interpolators and characteristic load points are computed once and frozen
//! into an [`EccParameter`] that only exposes read-only accessors.

use crate::carrier::CarrierSet;
use crate::curve::{Curve1D, CurveDef};
use crate::error::{ComponentError, ComponentResult};
use es_core::numeric::NormRange;
use serde::{Deserialize, Serialize};

/// Specific techno-economic figures per unit of rated size.
///
/// The size is the rated output [kW] for conversion components and the capacity
/// [kWh] for storage components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TechnoEconomic {
    /// [€/unit]
    pub spec_invest_cost: f64,
    /// [m³/unit]
    pub spec_volume: f64,
    /// [kg/unit]
    pub spec_mass: f64,
}

impl TechnoEconomic {
    pub fn invest_cost(&self, size: f64) -> f64 {
        self.spec_invest_cost * size
    }

    pub fn volume(&self, size: f64) -> f64 {
        self.spec_volume * size
    }

    pub fn mass(&self, size: f64) -> f64 {
        self.spec_mass * size
    }
}

fn default_norm_limits() -> [f64; 2] {
    [0.0, 1.0]
}

/// Raw, serializable parameter record.
///
/// Units: times in minutes, energies in kWh, powers in kW, ramp rates in percent of
/// rated output per minute, all other values relative (0..1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EccParameterDef {
    pub name: String,

    /// Time from cold to minimum load [min]
    pub t_start: f64,
    /// Energy for a full heatup [kWh]
    pub e_start: f64,
    /// Share of `e_start` retained as bulk energy
    pub eta_start: f64,

    /// Rated output [kW]
    pub p_out_rated: f64,
    /// Minimum operating load relative to rated
    pub p_out_min_rel: f64,
    /// Ramp-up limit in load operation [%/min]
    pub p_change_pos: f64,
    /// Ramp-down limit in load operation [%/min]
    pub p_change_neg: f64,

    /// Overall efficiency over relative output
    pub eta: CurveDef,
    /// Main-conversion path efficiency over relative output
    pub eta_mc: CurveDef,
    /// Bulk energy [kWh] over relative output
    pub e_loadchange: CurveDef,

    /// Time from minimum load to cold [min]
    pub t_cooldown: f64,

    /// Split of secondary input between the two secondary carriers
    pub split_p_sd: [f64; 2],
    /// Recoverable share of losses
    #[serde(default)]
    pub fact_p_heat_p_loss: f64,

    /// Control value range mapped onto relative output [0, 1]
    #[serde(default = "default_norm_limits")]
    pub norm_limits: [f64; 2],

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub techno_economic: Option<TechnoEconomic>,
}

/// Validated parameters with cached derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct EccParameter {
    def: EccParameterDef,
    carriers: CarrierSet,

    eta: Curve1D,
    eta_mc: Curve1D,
    e_loadchange: Curve1D,
    eta_in: Curve1D,
    eta_mc_in: Curve1D,
    norm: NormRange,

    split_p_sd1: f64,
    split_p_sd2: f64,

    p_change_start_rel: f64,
    p_change_cooldown_rel: f64,

    p_out_min: f64,
    p_out_etamax_rel: f64,
    p_out_etamax: f64,
    p_in_min: f64,
    p_in_max: f64,
    p_in_etamax: f64,
    p_in_mc_min: f64,
    p_in_mc_max: f64,
    p_in_mc_etamax: f64,
    e_start_bulk: f64,
    e_start_loss: f64,
}

impl EccParameter {
    pub fn new(def: EccParameterDef, carriers: CarrierSet) -> ComponentResult<Self> {
        validate_scalars(&def)?;

        let name = def.name.as_str();
        let wrap = |e: ComponentError| ComponentError::config(name, e.to_string());
        let eta = Curve1D::from_def("eta", &def.eta).map_err(wrap)?;
        let eta_mc = Curve1D::from_def("eta_mc", &def.eta_mc).map_err(wrap)?;
        let e_loadchange = Curve1D::from_def("e_loadchange", &def.e_loadchange).map_err(wrap)?;
        validate_efficiencies(name, &eta, &eta_mc)?;

        let eta_in = input_power_curve(name, "eta_in", &eta, def.p_out_rated)?;
        let eta_mc_in = input_power_curve(name, "eta_mc_in", &eta_mc, def.p_out_rated)?;
        let norm = NormRange::new(def.norm_limits, [0.0, 1.0])
            .map_err(|e| ComponentError::config(name, format!("norm_limits: {e}")))?;

        let m = def.p_out_min_rel;
        let rated = def.p_out_rated;
        let split_sum = def.split_p_sd[0] + def.split_p_sd[1];

        let p_out_min = m * rated;
        let p_out_etamax_rel = eta.x_at_y_max();
        let p_out_etamax = p_out_etamax_rel * rated;

        Ok(Self {
            split_p_sd1: def.split_p_sd[0] / split_sum,
            split_p_sd2: def.split_p_sd[1] / split_sum,
            p_change_start_rel: m / def.t_start,
            p_change_cooldown_rel: m / def.t_cooldown,
            p_out_min,
            p_out_etamax_rel,
            p_out_etamax,
            p_in_min: p_out_min / eta.eval(m),
            p_in_max: rated / eta.eval(1.0),
            p_in_etamax: p_out_etamax / eta.eval(p_out_etamax_rel),
            p_in_mc_min: p_out_min / eta_mc.eval(m),
            p_in_mc_max: rated / eta_mc.eval(1.0),
            p_in_mc_etamax: p_out_etamax / eta_mc.eval(p_out_etamax_rel),
            e_start_bulk: def.e_start * def.eta_start,
            e_start_loss: def.e_start * (1.0 - def.eta_start),
            eta,
            eta_mc,
            e_loadchange,
            eta_in,
            eta_mc_in,
            norm,
            carriers,
            def,
        })
    }

    pub fn def(&self) -> &EccParameterDef {
        &self.def
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn carriers(&self) -> &CarrierSet {
        &self.carriers
    }

    pub fn t_start(&self) -> f64 {
        self.def.t_start
    }

    pub fn e_start(&self) -> f64 {
        self.def.e_start
    }

    pub fn eta_start(&self) -> f64 {
        self.def.eta_start
    }

    pub fn p_out_rated(&self) -> f64 {
        self.def.p_out_rated
    }

    pub fn p_out_min_rel(&self) -> f64 {
        self.def.p_out_min_rel
    }

    pub fn p_change_pos(&self) -> f64 {
        self.def.p_change_pos
    }

    pub fn p_change_neg(&self) -> f64 {
        self.def.p_change_neg
    }

    pub fn t_cooldown(&self) -> f64 {
        self.def.t_cooldown
    }

    pub fn fact_p_heat_p_loss(&self) -> f64 {
        self.def.fact_p_heat_p_loss
    }

    pub fn techno_economic(&self) -> Option<&TechnoEconomic> {
        self.def.techno_economic.as_ref()
    }

    pub fn split_p_sd1(&self) -> f64 {
        self.split_p_sd1
    }

    pub fn split_p_sd2(&self) -> f64 {
        self.split_p_sd2
    }

    pub fn norm_range(&self) -> &NormRange {
        &self.norm
    }

    /// Startup ramp below minimum load [relative output / min].
    pub fn p_change_start_rel(&self) -> f64 {
        self.p_change_start_rel
    }

    /// Cooldown ramp below minimum load [relative output / min].
    pub fn p_change_cooldown_rel(&self) -> f64 {
        self.p_change_cooldown_rel
    }

    /// Load-operation ramp-up limit [relative output / min].
    pub fn p_change_pos_rel(&self) -> f64 {
        self.def.p_change_pos / 100.0
    }

    /// Load-operation ramp-down limit [relative output / min].
    pub fn p_change_neg_rel(&self) -> f64 {
        self.def.p_change_neg / 100.0
    }

    pub fn p_out_min(&self) -> f64 {
        self.p_out_min
    }

    pub fn p_out_etamax_rel(&self) -> f64 {
        self.p_out_etamax_rel
    }

    pub fn p_out_etamax(&self) -> f64 {
        self.p_out_etamax
    }

    pub fn p_in_min(&self) -> f64 {
        self.p_in_min
    }

    pub fn p_in_max(&self) -> f64 {
        self.p_in_max
    }

    pub fn p_in_etamax(&self) -> f64 {
        self.p_in_etamax
    }

    pub fn p_in_mc_min(&self) -> f64 {
        self.p_in_mc_min
    }

    pub fn p_in_mc_max(&self) -> f64 {
        self.p_in_mc_max
    }

    pub fn p_in_mc_etamax(&self) -> f64 {
        self.p_in_mc_etamax
    }

    pub fn e_start_bulk(&self) -> f64 {
        self.e_start_bulk
    }

    pub fn e_start_loss(&self) -> f64 {
        self.e_start_loss
    }

    /// Highest relative output covered by the efficiency curve (at least 1).
    pub fn p_rel_max(&self) -> f64 {
        self.eta.x().last().copied().unwrap_or(1.0).max(1.0)
    }

    pub fn eta_at(&self, p_rel: f64) -> f64 {
        self.eta.eval(p_rel)
    }

    pub fn eta_mc_at(&self, p_rel: f64) -> f64 {
        self.eta_mc.eval(p_rel)
    }

    /// Overall efficiency over absolute input power [kW].
    pub fn eta_at_input(&self, p_in_kw: f64) -> f64 {
        self.eta_in.eval(p_in_kw)
    }

    /// Main-conversion efficiency over absolute main-conversion input [kW].
    pub fn eta_mc_at_input(&self, p_in_mc_kw: f64) -> f64 {
        self.eta_mc_in.eval(p_in_mc_kw)
    }

    pub fn e_loadchange_at(&self, p_rel: f64) -> f64 {
        self.e_loadchange.eval(p_rel)
    }

    /// Bulk energy held by the heatup reservoir.
    pub fn bulk_heatup(&self, heatup: f64) -> f64 {
        heatup * self.e_start_bulk
    }

    /// Operational bulk energy, zero at minimum load and below.
    pub fn bulk_op(&self, p_rel: f64) -> f64 {
        let m = self.def.p_out_min_rel;
        self.e_loadchange.eval(p_rel.max(m)) - self.e_loadchange.eval(m)
    }

    pub fn bulk(&self, heatup: f64, p_rel: f64) -> f64 {
        self.bulk_heatup(heatup) + self.bulk_op(p_rel)
    }
}

fn validate_scalars(def: &EccParameterDef) -> ComponentResult<()> {
    let name = def.name.as_str();
    let finite = [
        ("t_start", def.t_start),
        ("e_start", def.e_start),
        ("eta_start", def.eta_start),
        ("p_out_rated", def.p_out_rated),
        ("p_out_min_rel", def.p_out_min_rel),
        ("p_change_pos", def.p_change_pos),
        ("p_change_neg", def.p_change_neg),
        ("t_cooldown", def.t_cooldown),
        ("split_p_sd[0]", def.split_p_sd[0]),
        ("split_p_sd[1]", def.split_p_sd[1]),
        ("fact_p_heat_p_loss", def.fact_p_heat_p_loss),
    ];
    if let Some((field, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
        return Err(ComponentError::config(
            name,
            format!("{field} must be finite, got {value}"),
        ));
    }

    let positive = [
        ("t_start", def.t_start),
        ("t_cooldown", def.t_cooldown),
        ("p_out_rated", def.p_out_rated),
        ("p_change_pos", def.p_change_pos),
        ("p_change_neg", def.p_change_neg),
    ];
    if let Some((field, value)) = positive.iter().find(|(_, v)| *v <= 0.0) {
        return Err(ComponentError::config(
            name,
            format!("{field} must be positive, got {value}"),
        ));
    }

    if !(def.p_out_min_rel > 0.0 && def.p_out_min_rel < 1.0) {
        return Err(ComponentError::config(
            name,
            format!("p_out_min_rel must lie in (0, 1), got {}", def.p_out_min_rel),
        ));
    }
    if def.e_start < 0.0 {
        return Err(ComponentError::config(name, "e_start must not be negative"));
    }
    if !(0.0..=1.0).contains(&def.eta_start) {
        return Err(ComponentError::config(name, "eta_start must lie in [0, 1]"));
    }
    if !(0.0..=1.0).contains(&def.fact_p_heat_p_loss) {
        return Err(ComponentError::config(
            name,
            "fact_p_heat_p_loss must lie in [0, 1]",
        ));
    }
    let [s1, s2] = def.split_p_sd;
    if s1 < 0.0 || s2 < 0.0 {
        return Err(ComponentError::config(
            name,
            "split_p_sd entries must not be negative",
        ));
    }
    if s1 + s2 <= 0.0 {
        return Err(ComponentError::config(
            name,
            "split_p_sd entries must not both be zero",
        ));
    }
    Ok(())
}

fn validate_efficiencies(name: &str, eta: &Curve1D, eta_mc: &Curve1D) -> ComponentResult<()> {
    for curve in [eta, eta_mc] {
        if curve.x()[0] < 0.0 {
            return Err(ComponentError::config(
                name,
                format!("{} samples must start at a non-negative load", curve.name()),
            ));
        }
        if let Some(v) = curve.y().iter().find(|&&v| v <= 0.0) {
            return Err(ComponentError::config(
                name,
                format!("{} samples must be positive, got {v}", curve.name()),
            ));
        }
    }
    // Both curves are piecewise linear, so checking every breakpoint is sufficient.
    for &x in eta.x().iter().chain(eta_mc.x()) {
        let (e, e_mc) = (eta.eval(x), eta_mc.eval(x));
        if e_mc < e - 1e-12 {
            return Err(ComponentError::config(
                name,
                format!(
                    "eta_mc ({e_mc}) below eta ({e}) at load {x}: secondary input would be negative"
                ),
            ));
        }
    }
    Ok(())
}

/// Efficiency over absolute input power, built sample by sample from `curve`.
fn input_power_curve(
    name: &str,
    curve_name: &'static str,
    curve: &Curve1D,
    rated: f64,
) -> ComponentResult<Curve1D> {
    let p_in: Vec<f64> = curve
        .x()
        .iter()
        .zip(curve.y())
        .map(|(x, eta)| x * rated / eta)
        .collect();
    Curve1D::new(curve_name, p_in, curve.y().to_vec())
        .map_err(|e| ComponentError::config(name, e.to_string()))
}
