//! es-components: component library for energy-system simulation.
//!
//! Provides lumped-parameter models of:
//! - Energy-conversion components (fuel cells, electrolyzers, crackers, boilers)
//!   with startup/cooldown dynamics, ramp limits and bulk energy
//! - Energy-storage components (batteries) with optional capacity growth
//!
//! Both implement [`EnergyComponent`] and advance one fixed timestep per call.
//!
//! # Example
//!
//! ```no_run
//! use es_components::{CarrierSet, CurveDef, EccParameter, EccParameterDef};
//! use es_components::EnergyConversionComponent;
//! use es_core::units::minutes;
//!
//! let def = EccParameterDef {
//!     name: "SOFC".into(),
//!     t_start: 10.0,
//!     e_start: 10.0,
//!     eta_start: 0.5,
//!     p_out_rated: 2000.0,
//!     p_out_min_rel: 0.15,
//!     p_change_pos: 5.0,
//!     p_change_neg: 5.0,
//!     eta: CurveDef::new(vec![0.15, 1.0], vec![0.90, 0.91]),
//!     eta_mc: CurveDef::new(vec![0.15, 1.0], vec![0.92, 0.95]),
//!     e_loadchange: CurveDef::new(vec![0.0, 0.15, 1.0], vec![0.0, 0.0, 20.0]),
//!     t_cooldown: 10.0,
//!     split_p_sd: [0.95, 0.05],
//!     fact_p_heat_p_loss: 1.0,
//!     norm_limits: [0.0, 1.0],
//!     techno_economic: None,
//! };
//! let par = EccParameter::new(def, CarrierSet::default()).unwrap();
//! let mut sofc = EnergyConversionComponent::new(par, minutes(1.0), None).unwrap();
//!
//! sofc.apply_target(1.0).unwrap();
//! println!("heatup after one minute: {}", sofc.state().heatup);
//! ```

pub mod carrier;
pub mod common;
pub mod conversion;
pub mod curve;
pub mod error;
pub mod storage;
pub mod traits;

// Re-exports
pub use carrier::{CarrierSet, EnergyCarrier};
pub use conversion::{
    BalanceCheck, BalancePolicy, ControlKind, ControlOptions, DEFAULT_MAX_ITERATIONS, EccParameter,
    EccParameterDef, EccState, EnergyConversionComponent, TechnoEconomic,
};
pub use curve::{Curve1D, CurveDef};
pub use error::{ComponentError, ComponentResult};
pub use storage::{CapacityCell, EnergyStorageComponent, EscParameter, EscParameterDef, EscState};
pub use traits::{EnergyComponent, FlatRecord};
