//! Energy-conversion components.
//!
//! [`EnergyConversionComponent`] advances a component one timestep at a time:
//! the control value is turned into a relative output target, [`ramp`] moves the
//! output towards it within the rate limits, and [`accounting`] derives all energy
//! and power flows of the step.

pub mod accounting;
pub mod component;
pub mod flows;
pub mod parameter;
pub mod ramp;
pub mod state;

pub use accounting::{BalanceCheck, BalancePolicy, Compensation, Transition};
pub use component::{
    ControlKind, ControlOptions, DEFAULT_MAX_ITERATIONS, EnergyConversionComponent,
};
pub use flows::FlowRecord;
pub use parameter::{EccParameter, EccParameterDef, TechnoEconomic};
pub use ramp::{Ramp, RampRegime};
pub use state::EccState;
