//! Project loading, saving, validation, and introspection.

use std::path::Path;

use es_project::{ConversionDef, ProfileDef, ProfileKind, Project, StorageDef};
use es_sim::LoadProfile;
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Load and validate a project (`.json` or YAML).
pub fn load_project(path: &Path) -> AppResult<Project> {
    Ok(es_project::load(path)?)
}

/// Save a project, choosing the format by file extension.
pub fn save_project(path: &Path, project: &Project) -> AppResult<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => es_project::save_json(path, project)?,
        _ => es_project::save_yaml(path, project)?,
    }
    Ok(())
}

pub fn validate_project(project: &Project) -> AppResult<()> {
    es_project::validate_project(project)?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Conversion,
    Storage,
}

impl ComponentKind {
    pub fn label(self) -> &'static str {
        match self {
            ComponentKind::Conversion => "conversion",
            ComponentKind::Storage => "storage",
        }
    }
}

/// Summary of a component for listing.
#[derive(Debug, Clone)]
pub struct ComponentSummary {
    pub id: String,
    pub name: String,
    pub kind: ComponentKind,
    /// Rated output [kW] or storage capacity [kWh]
    pub size: f64,
    /// Output carrier id
    pub carrier: String,
}

/// A component definition of either kind.
#[derive(Debug, Clone, Copy, Serialize)]
pub enum ComponentRef<'a> {
    Conversion(&'a ConversionDef),
    Storage(&'a StorageDef),
}

impl ComponentRef<'_> {
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentRef::Conversion(_) => ComponentKind::Conversion,
            ComponentRef::Storage(_) => ComponentKind::Storage,
        }
    }

    /// Ids of all carriers the component references.
    pub fn carrier_ids(&self) -> Vec<&str> {
        match self {
            ComponentRef::Conversion(c) => vec![
                c.carriers.in_mc.as_str(),
                c.carriers.in_sd1.as_str(),
                c.carriers.in_sd2.as_str(),
                c.carriers.out.as_str(),
            ],
            ComponentRef::Storage(s) => vec![s.carrier.as_str()],
        }
    }
}

/// Find component `id` among conversions and storages.
pub fn find_component<'a>(project: &'a Project, id: &str) -> AppResult<ComponentRef<'a>> {
    if let Some(c) = project.conversion(id) {
        return Ok(ComponentRef::Conversion(c));
    }
    project
        .storage(id)
        .map(ComponentRef::Storage)
        .ok_or_else(|| AppError::ComponentNotFound(id.to_string()))
}

pub fn find_profile<'a>(project: &'a Project, id: &str) -> AppResult<&'a ProfileDef> {
    project
        .profile(id)
        .ok_or_else(|| AppError::ProfileNotFound(id.to_string()))
}

/// List all components in the project, conversions first.
pub fn list_components(project: &Project) -> Vec<ComponentSummary> {
    let conversions = project.conversions.iter().map(|c| ComponentSummary {
        id: c.id.clone(),
        name: c.parameter.name.clone(),
        kind: ComponentKind::Conversion,
        size: c.parameter.p_out_rated,
        carrier: c.carriers.out.clone(),
    });
    let storages = project.storages.iter().map(|s| ComponentSummary {
        id: s.id.clone(),
        name: s.parameter.name.clone(),
        kind: ComponentKind::Storage,
        size: s.parameter.e_cap,
        carrier: s.carrier.clone(),
    });
    conversions.chain(storages).collect()
}

/// Simulation profile described by a project profile definition.
pub fn load_profile(def: &ProfileDef) -> AppResult<LoadProfile> {
    let profile = match &def.kind {
        ProfileKind::Constant { value, steps } => {
            LoadProfile::constant(def.name.clone(), def.ts_min, *value, *steps)?
        }
        ProfileKind::HoldThenRelease { value, steps } => {
            LoadProfile::hold_then_release(def.name.clone(), def.ts_min, *value, *steps)?
        }
        ProfileKind::Values { values } => {
            LoadProfile::from_values(def.name.clone(), def.ts_min, values.clone())?
        }
    };
    Ok(profile)
}
