//! Run execution and caching service.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use es_components::{DEFAULT_MAX_ITERATIONS, EccState, EnergyComponent};
use es_project::{CarrierDef, ProfileDef, Project};
use es_results::{RunManifest, RunStore, RunType, TimeseriesRecord, columns_of};
use es_sim::{LoadProfile, SimOptions, SimSummary, run_profile, stationary_sweep, sweep_targets};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::project_service::{self, ComponentRef};

/// Version recorded in manifests and mixed into run ids.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run mode specification.
#[derive(Debug, Clone, PartialEq)]
pub enum RunMode {
    /// Drive the component over a project profile
    Profile { profile_id: String },
    /// Stationary points at `points` evenly spaced targets
    Stationary { ts_min: f64, points: usize },
}

/// Options for running simulations.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub engine_version: String,
    pub record_every: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            engine_version: ENGINE_VERSION.to_string(),
            record_every: 1,
        }
    }
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub project_path: &'a Path,
    pub component_id: &'a str,
    pub mode: RunMode,
    pub options: RunOptions,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub loaded_from_cache: bool,
}

/// Everything that determines a run's output.
#[derive(Serialize)]
struct RunInputs<'a> {
    component: ComponentRef<'a>,
    carriers: Vec<&'a CarrierDef>,
    profile: Option<&'a ProfileDef>,
    record_every: usize,
}

impl<'a> RunInputs<'a> {
    fn new(
        project: &'a Project,
        component: ComponentRef<'a>,
        profile: Option<&'a ProfileDef>,
        record_every: usize,
    ) -> Self {
        let ids = component.carrier_ids();
        let carriers = project
            .carriers
            .iter()
            .filter(|c| ids.contains(&c.id.as_str()))
            .collect();
        Self {
            component,
            carriers,
            profile,
            record_every,
        }
    }
}

/// Output of one executed run, before it is stored.
struct RunOutput {
    records: Vec<TimeseriesRecord>,
    columns: Vec<String>,
    totals: BTreeMap<String, f64>,
}

/// Execute or load a run based on request.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    if request.options.record_every == 0 {
        return Err(AppError::InvalidInput(
            "record_every must be positive".to_string(),
        ));
    }

    let project = project_service::load_project(request.project_path)?;
    let component = project_service::find_component(&project, request.component_id)?;

    let (profile_def, run_type) = match &request.mode {
        RunMode::Profile { profile_id } => {
            let def = project_service::find_profile(&project, profile_id)?;
            let run_type = RunType::Profile {
                ts_min: def.ts_min,
                steps: def.kind.steps(),
            };
            (Some(def), run_type)
        }
        RunMode::Stationary { ts_min, points } => {
            if !matches!(component, ComponentRef::Conversion(_)) {
                return Err(AppError::InvalidInput(format!(
                    "stationary points need a conversion component, '{}' is a storage",
                    request.component_id
                )));
            }
            if *points == 0 || !(ts_min.is_finite() && *ts_min > 0.0) {
                return Err(AppError::InvalidInput(
                    "stationary sweep needs points > 0 and a positive timestep".to_string(),
                ));
            }
            let run_type = RunType::Stationary {
                ts_min: *ts_min,
                points: *points,
            };
            (None, run_type)
        }
    };

    let inputs = RunInputs::new(&project, component, profile_def, request.options.record_every);
    let run_id =
        es_results::compute_run_id(&inputs, &run_type, &request.options.engine_version)?;

    let store = RunStore::for_project(request.project_path)?;

    if request.options.use_cache && store.has_run(&run_id) {
        let manifest = store.load_manifest(&run_id)?;
        tracing::info!(run_id = %run_id, "loaded cached run");
        return Ok(RunResponse {
            run_id,
            manifest,
            loaded_from_cache: true,
        });
    }

    let output = match (&request.mode, profile_def) {
        (RunMode::Stationary { ts_min, points }, _) => {
            execute_stationary(&project, request.component_id, *ts_min, *points)?
        }
        (RunMode::Profile { .. }, Some(def)) => {
            let profile = project_service::load_profile(def)?;
            let opts = SimOptions {
                record_every: request.options.record_every,
                ..SimOptions::default()
            };
            match component {
                ComponentRef::Conversion(_) => {
                    let ecc = es_project::build_conversion(
                        &project,
                        request.component_id,
                        profile.ts_min,
                    )?;
                    execute_profile(ecc, &profile, &opts)?
                }
                ComponentRef::Storage(_) => {
                    let esc =
                        es_project::build_storage(&project, request.component_id, profile.ts_min)?;
                    execute_profile(esc, &profile, &opts)?
                }
            }
        }
        (RunMode::Profile { profile_id }, None) => {
            return Err(AppError::ProfileNotFound(profile_id.clone()));
        }
    };

    let manifest = RunManifest {
        run_id: run_id.clone(),
        component_id: request.component_id.to_string(),
        profile_id: profile_def.map(|p| p.id.clone()),
        timestamp: chrono::Utc::now().to_rfc3339(),
        run_type,
        engine_version: request.options.engine_version.clone(),
        columns: output.columns,
        totals: output.totals,
    };
    store.save_run(&manifest, &output.records)?;
    tracing::info!(
        run_id = %run_id,
        component = request.component_id,
        records = output.records.len(),
        "run saved"
    );

    Ok(RunResponse {
        run_id,
        manifest,
        loaded_from_cache: false,
    })
}

fn execute_profile<C: EnergyComponent>(
    mut component: C,
    profile: &LoadProfile,
    opts: &SimOptions,
) -> AppResult<RunOutput> {
    let record = run_profile(&mut component, profile, opts)?;
    let records = record
        .iter()
        .map(|(step, t, x)| TimeseriesRecord::from_state(step, t, x))
        .collect();
    Ok(RunOutput {
        records,
        columns: columns_of::<C::State>(),
        totals: summary_totals(&record.summary),
    })
}

fn execute_stationary(
    project: &Project,
    component_id: &str,
    ts_min: f64,
    points: usize,
) -> AppResult<RunOutput> {
    let par = es_project::conversion_parameter(project, component_id)?;
    let targets = sweep_targets(points);
    let solved = stationary_sweep(&par, ts_min, &targets, DEFAULT_MAX_ITERATIONS)?;

    let records = solved
        .iter()
        .enumerate()
        .map(|(i, point)| {
            TimeseriesRecord::from_state(i, point.iterations as f64 * ts_min, &point.state)
                .with_value("target", point.target)
                .with_value("iterations", point.iterations as f64)
        })
        .collect();
    let mut columns = vec!["target".to_string(), "iterations".to_string()];
    columns.extend(columns_of::<EccState>());

    Ok(RunOutput {
        records,
        columns,
        totals: BTreeMap::new(),
    })
}

/// Manifest totals: summed flows plus the largest balance residual.
fn summary_totals(summary: &SimSummary) -> BTreeMap<String, f64> {
    let mut totals = summary.totals.clone();
    totals.insert("max_abs_E_balance".to_string(), summary.max_abs_balance);
    totals.insert("duration_min".to_string(), summary.duration_min);
    totals
}

/// List cached runs of a component, most recent first.
pub fn list_runs(project_path: &Path, component_id: &str) -> AppResult<Vec<RunManifest>> {
    let store = RunStore::for_project(project_path)?;

    let mut runs = store.list_runs(component_id)?;
    runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(runs)
}

/// Load a specific run.
pub fn load_run(
    project_path: &Path,
    run_id: &str,
) -> AppResult<(RunManifest, Vec<TimeseriesRecord>)> {
    let store = RunStore::for_project(project_path)?;

    let manifest = store.load_manifest(run_id)?;
    let records = store.load_timeseries(run_id)?;

    Ok((manifest, records))
}

/// Write a stored run as CSV; returns the number of rows.
pub fn export_csv<W: Write>(project_path: &Path, run_id: &str, out: W) -> AppResult<usize> {
    let (manifest, records) = load_run(project_path, run_id)?;
    es_results::write_csv(out, &manifest.columns, &records)?;
    Ok(records.len())
}

/// Values of the last record of a run in export order.
pub fn final_values(manifest: &RunManifest, records: &[TimeseriesRecord]) -> Vec<(String, f64)> {
    let Some(last) = records.last() else {
        return vec![];
    };
    manifest
        .columns
        .iter()
        .filter_map(|name| last.get(name).map(|v| (name.clone(), v)))
        .collect()
}
