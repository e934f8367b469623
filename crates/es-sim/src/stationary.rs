//! Stationary operating points and timestep sensitivity of a conversion component.

use crate::error::{SimError, SimResult};
use crate::profile::LoadProfile;
use crate::sim::{SimOptions, SimSummary, run_profile};
use es_components::{EccParameter, EccState, EnergyConversionComponent};
use es_core::units::minutes;
use rayon::prelude::*;

/// Settled state of a component held at one target.
#[derive(Clone, Debug)]
pub struct StationaryPoint {
    pub target: f64,
    /// Steps taken before output and input settled
    pub iterations: usize,
    pub state: EccState,
}

/// Solve the stationary state for every target, starting each from cold.
///
/// Each target runs on its own component, so points are evaluated in parallel.
pub fn stationary_sweep(
    par: &EccParameter,
    ts_min: f64,
    targets: &[f64],
    max_iterations: usize,
) -> SimResult<Vec<StationaryPoint>> {
    targets
        .par_iter()
        .map(|&target| -> SimResult<StationaryPoint> {
            let mut ecc = EnergyConversionComponent::new(par.clone(), minutes(ts_min), None)?;
            let iterations = ecc.apply_control_stationary(target, max_iterations)?;
            Ok(StationaryPoint {
                target,
                iterations,
                state: ecc.state().clone(),
            })
        })
        .collect()
}

/// Evenly spaced targets from 0 to 1 inclusive.
pub fn sweep_targets(points: usize) -> Vec<f64> {
    match points {
        0 => vec![],
        1 => vec![1.0],
        n => (0..n).map(|i| i as f64 / (n - 1) as f64).collect(),
    }
}

/// Result of one run of a timestep study.
#[derive(Clone, Debug)]
pub struct TimestepRun {
    pub ts_min: f64,
    pub steps: usize,
    pub summary: SimSummary,
    pub final_state: EccState,
}

/// Run the same hold-then-release scenario over `horizon_min` with each timestep.
///
/// Energy totals of a well-resolved component should agree across timesteps.
pub fn timestep_study(
    par: &EccParameter,
    target: f64,
    horizon_min: f64,
    timesteps: &[f64],
) -> SimResult<Vec<TimestepRun>> {
    if !(horizon_min.is_finite() && horizon_min > 0.0) {
        return Err(SimError::InvalidArg {
            what: "horizon must be positive",
        });
    }
    timesteps
        .par_iter()
        .map(|&ts_min| -> SimResult<TimestepRun> {
            if !(ts_min.is_finite() && ts_min > 0.0) {
                return Err(SimError::InvalidArg {
                    what: "timestep must be positive",
                });
            }
            let steps = (horizon_min / ts_min).floor() as usize;
            if steps == 0 {
                return Err(SimError::InvalidArg {
                    what: "timestep longer than horizon",
                });
            }
            let profile = LoadProfile::hold_then_release(
                format!("hold {target} for {horizon_min} min"),
                ts_min,
                target,
                steps,
            )?;
            let mut ecc = EnergyConversionComponent::new(par.clone(), minutes(ts_min), None)?;
            let opts = SimOptions {
                record_every: steps,
                ..SimOptions::default()
            };
            let record = run_profile(&mut ecc, &profile, &opts)?;
            tracing::debug!(component = par.name(), ts_min, steps, "timestep run");
            Ok(TimestepRun {
                ts_min,
                steps,
                summary: record.summary,
                final_state: ecc.state().clone(),
            })
        })
        .collect()
}
