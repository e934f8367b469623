//! Simulation of energy-system components over load profiles.
//!
//! Provides:
//! - Load profiles (constant, hold-then-release, explicit values)
//! - A generic runner for anything implementing `EnergyComponent`
//! - Parallel stationary sweeps and timestep studies for conversion components

pub mod error;
pub mod profile;
pub mod sim;
pub mod stationary;

pub use error::{SimError, SimResult};
pub use profile::LoadProfile;
pub use sim::{SimOptions, SimRecord, SimSummary, run_profile};
pub use stationary::{
    StationaryPoint, TimestepRun, stationary_sweep, sweep_targets, timestep_study,
};
