//! es-project: project file format, validation and component construction.

pub mod registry;
pub mod schema;
pub mod validate;

pub use registry::CarrierRegistry;
pub use schema::*;
pub use validate::{ValidationError, validate_project};

use es_components::{EccParameter, EnergyConversionComponent, EnergyStorageComponent, EscParameter};
use es_core::units::minutes;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error("Component error: {0}")]
    Component(#[from] es_components::ComponentError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &std::path::Path) -> ProjectResult<Project> {
    let content = std::fs::read_to_string(path)?;
    let project: Project = serde_yaml::from_str(&content)?;
    validate_project(&project)?;
    Ok(project)
}

pub fn save_yaml(path: &std::path::Path, project: &Project) -> ProjectResult<()> {
    validate_project(project)?;
    let content = serde_yaml::to_string(project)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> ProjectResult<Project> {
    let content = std::fs::read_to_string(path)?;
    let project: Project = serde_json::from_str(&content)?;
    validate_project(&project)?;
    Ok(project)
}

pub fn save_json(path: &std::path::Path, project: &Project) -> ProjectResult<()> {
    validate_project(project)?;
    let content = serde_json::to_string_pretty(project)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load a project, choosing the format by file extension (`.json`, else YAML).
pub fn load(path: &std::path::Path) -> ProjectResult<Project> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_json(path),
        _ => load_yaml(path),
    }
}

fn conversion_def<'a>(project: &'a Project, id: &str) -> ProjectResult<&'a ConversionDef> {
    project.conversion(id).ok_or_else(|| ProjectError::NotFound {
        what: format!("conversion component '{id}'"),
    })
}

fn storage_def<'a>(project: &'a Project, id: &str) -> ProjectResult<&'a StorageDef> {
    project.storage(id).ok_or_else(|| ProjectError::NotFound {
        what: format!("storage component '{id}'"),
    })
}

/// Validated parameters of conversion component `id`.
pub fn conversion_parameter(project: &Project, id: &str) -> ProjectResult<EccParameter> {
    let def = conversion_def(project, id)?;
    let registry = CarrierRegistry::from_project(project);
    Ok(validate::conversion_parameter(def, &registry)?)
}

/// Validated parameters of storage component `id`.
pub fn storage_parameter(project: &Project, id: &str) -> ProjectResult<EscParameter> {
    let def = storage_def(project, id)?;
    let registry = CarrierRegistry::from_project(project);
    Ok(validate::storage_parameter(def, &registry)?)
}

/// Build conversion component `id` with timestep `ts_min` [min] in its initial state.
pub fn build_conversion(
    project: &Project,
    id: &str,
    ts_min: f64,
) -> ProjectResult<EnergyConversionComponent> {
    let def = conversion_def(project, id)?;
    let par = conversion_parameter(project, id)?;
    let initial = validate::initial_state(def, &par)?;
    Ok(EnergyConversionComponent::new(
        par,
        minutes(ts_min),
        Some(initial),
    )?)
}

/// Build storage component `id` with timestep `ts_min` [min].
pub fn build_storage(
    project: &Project,
    id: &str,
    ts_min: f64,
) -> ProjectResult<EnergyStorageComponent> {
    let def = storage_def(project, id)?;
    let par = storage_parameter(project, id)?;
    Ok(EnergyStorageComponent::new(
        par,
        minutes(ts_min),
        def.soc_initial,
    )?)
}
