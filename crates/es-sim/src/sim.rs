//! Simulation runner and result recording.

use crate::error::{SimError, SimResult};
use crate::profile::LoadProfile;
use es_components::{EnergyComponent, FlatRecord};
use es_core::numeric::{Tolerances, nearly_equal};
use es_core::units::as_minutes;
use std::collections::BTreeMap;

/// Options for simulation runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Record every N-th step (decimation)
    pub record_every: usize,
    /// Maximum number of steps (safety limit); longer profiles are truncated
    pub max_steps: usize,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            record_every: 1,
            max_steps: 1_000_000,
        }
    }
}

/// Energy totals over a run.
///
/// Totals cover every applied step, including those dropped by decimation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimSummary {
    pub steps: usize,
    pub duration_min: f64,
    /// Summed energy flows [kWh] by field name (`E_in`, `E_out`, ...)
    pub totals: BTreeMap<String, f64>,
    /// Largest |E_balance| of any step [kWh]
    pub max_abs_balance: f64,
}

/// Energy levels rather than flows; these are not summed.
fn is_energy_flow(name: &str) -> bool {
    name.starts_with("E_")
        && !name.starts_with("E_bulk")
        && !name.starts_with("E_cap")
        && name != "E_balance"
}

impl SimSummary {
    /// Add one applied step of length `ts_min`.
    pub fn accumulate<S: FlatRecord>(&mut self, state: &S, ts_min: f64) {
        self.steps += 1;
        self.duration_min += ts_min;
        for (name, value) in state.to_pairs() {
            if name == "E_balance" {
                self.max_abs_balance = self.max_abs_balance.max(value.abs());
            } else if is_energy_flow(name) {
                *self.totals.entry(name.to_string()).or_insert(0.0) += value;
            }
        }
    }

    /// Total of flow `name` [kWh], zero if the state has no such field.
    pub fn total(&self, name: &str) -> f64 {
        self.totals.get(name).copied().unwrap_or(0.0)
    }
}

/// Record of simulation results.
#[derive(Clone, Debug)]
pub struct SimRecord<S> {
    /// Step index (0 is the initial state)
    pub step: Vec<usize>,
    /// Elapsed time [min]
    pub t_min: Vec<f64>,
    /// State snapshots
    pub x: Vec<S>,
    pub summary: SimSummary,
}

impl<S> SimRecord<S> {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn last(&self) -> Option<&S> {
        self.x.last()
    }

    /// (step, elapsed minutes, state) triples in recording order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64, &S)> {
        self.step
            .iter()
            .zip(&self.t_min)
            .zip(&self.x)
            .map(|((&step, &t), x)| (step, t, x))
    }
}

/// Drive `component` through `profile`, one control value per step.
///
/// The state before the first step is recorded at step 0. The final state is
/// always recorded, even when it falls between decimation points.
pub fn run_profile<C: EnergyComponent>(
    component: &mut C,
    profile: &LoadProfile,
    opts: &SimOptions,
) -> SimResult<SimRecord<C::State>> {
    if opts.record_every == 0 {
        return Err(SimError::InvalidArg {
            what: "record_every must be positive",
        });
    }
    if opts.max_steps == 0 {
        return Err(SimError::InvalidArg {
            what: "max_steps must be positive",
        });
    }
    let ts = as_minutes(component.timestep());
    if !nearly_equal(ts, profile.ts_min, Tolerances::default()) {
        return Err(SimError::TimestepMismatch {
            profile_min: profile.ts_min,
            component_min: ts,
        });
    }
    if profile.len() > opts.max_steps {
        tracing::warn!(
            profile = %profile.name,
            steps = profile.len(),
            max_steps = opts.max_steps,
            "profile truncated"
        );
    }

    let mut record = SimRecord {
        step: vec![0],
        t_min: vec![0.0],
        x: vec![component.state().clone()],
        summary: SimSummary::default(),
    };

    let mut step = 0;
    for &value in profile.values.iter().take(opts.max_steps) {
        component
            .apply(value)
            .map_err(|source| SimError::Step {
                step: step + 1,
                source,
            })?;
        step += 1;
        record.summary.accumulate(component.state(), ts);
        tracing::trace!(component = component.name(), step, value, "applied");

        if step % opts.record_every == 0 {
            record.step.push(step);
            record.t_min.push(step as f64 * ts);
            record.x.push(component.state().clone());
        }
    }

    // Always record final state
    if step % opts.record_every != 0 {
        record.step.push(step);
        record.t_min.push(step as f64 * ts);
        record.x.push(component.state().clone());
    }

    tracing::debug!(
        component = component.name(),
        profile = %profile.name,
        steps = step,
        max_abs_balance = record.summary.max_abs_balance,
        "run finished"
    );
    Ok(record)
}
