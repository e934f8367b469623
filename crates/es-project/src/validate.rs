//! Project validation logic.

use crate::registry::CarrierRegistry;
use crate::schema::{ConversionDef, InitialStateDef, ProfileDef, ProfileKind, Project, StorageDef};
use es_components::{ComponentError, EccParameter, EccState, EscParameter};
use std::collections::HashSet;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },

    #[error("Component '{id}': {source}")]
    Component {
        id: String,
        #[source]
        source: ComponentError,
    },
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > crate::schema::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    check_unique(project.carriers.iter().map(|c| c.id.as_str()), "carriers")?;
    check_unique(
        project.conversions.iter().map(|c| c.id.as_str()),
        "conversions",
    )?;
    check_unique(project.storages.iter().map(|s| s.id.as_str()), "storages")?;
    check_unique(project.profiles.iter().map(|p| p.id.as_str()), "profiles")?;

    for carrier in &project.carriers {
        if !carrier.carrier.has_valid_color() {
            return Err(ValidationError::InvalidValue {
                field: format!("carrier '{}' color", carrier.id),
                value: carrier.carrier.color.clone(),
                reason: "expected hex code #rrggbb".to_string(),
            });
        }
    }

    let registry = CarrierRegistry::from_project(project);
    for conversion in &project.conversions {
        validate_conversion(conversion, &registry)?;
    }
    for storage in &project.storages {
        validate_storage(storage, &registry)?;
    }
    for profile in &project.profiles {
        validate_profile(profile)?;
    }

    Ok(())
}

fn check_unique<'a>(
    ids: impl Iterator<Item = &'a str>,
    context: &str,
) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateId {
                id: id.to_string(),
                context: context.to_string(),
            });
        }
    }
    Ok(())
}

/// Build the validated parameters of a conversion component.
pub(crate) fn conversion_parameter(
    def: &ConversionDef,
    registry: &CarrierRegistry,
) -> Result<EccParameter, ValidationError> {
    let carriers = registry.resolve(&def.carriers, &def.id)?;
    EccParameter::new(def.parameter.clone(), carriers).map_err(|source| {
        ValidationError::Component {
            id: def.id.clone(),
            source,
        }
    })
}

/// Initial state of a conversion component as described by the project.
pub(crate) fn initial_state(
    def: &ConversionDef,
    par: &EccParameter,
) -> Result<EccState, ValidationError> {
    match def.initial {
        InitialStateDef::Cold => Ok(EccState::cold()),
        InitialStateDef::Operating { p_rel } => {
            EccState::operating(par, p_rel).map_err(|source| ValidationError::Component {
                id: def.id.clone(),
                source,
            })
        }
    }
}

pub(crate) fn storage_parameter(
    def: &StorageDef,
    registry: &CarrierRegistry,
) -> Result<EscParameter, ValidationError> {
    let carriers = registry.resolve_uniform(&def.carrier, &def.id)?;
    EscParameter::new(def.parameter.clone(), carriers).map_err(|source| {
        ValidationError::Component {
            id: def.id.clone(),
            source,
        }
    })
}

fn validate_conversion(
    def: &ConversionDef,
    registry: &CarrierRegistry,
) -> Result<(), ValidationError> {
    let par = conversion_parameter(def, registry)?;
    initial_state(def, &par)?;
    Ok(())
}

fn validate_storage(def: &StorageDef, registry: &CarrierRegistry) -> Result<(), ValidationError> {
    storage_parameter(def, registry)?;
    if !(0.0..=1.0).contains(&def.soc_initial) {
        return Err(ValidationError::InvalidValue {
            field: format!("storage '{}' soc_initial", def.id),
            value: def.soc_initial.to_string(),
            reason: "must lie in [0, 1]".to_string(),
        });
    }
    Ok(())
}

fn validate_profile(profile: &ProfileDef) -> Result<(), ValidationError> {
    if !(profile.ts_min.is_finite() && profile.ts_min > 0.0) {
        return Err(ValidationError::InvalidValue {
            field: format!("profile '{}' ts_min", profile.id),
            value: profile.ts_min.to_string(),
            reason: "timestep must be positive".to_string(),
        });
    }
    if profile.kind.steps() == 0 {
        return Err(ValidationError::InvalidValue {
            field: format!("profile '{}' steps", profile.id),
            value: "0".to_string(),
            reason: "profile must contain at least one step".to_string(),
        });
    }
    let non_finite = match &profile.kind {
        ProfileKind::Constant { value, .. } | ProfileKind::HoldThenRelease { value, .. } => {
            (!value.is_finite()).then_some(*value)
        }
        ProfileKind::Values { values } => values.iter().copied().find(|v| !v.is_finite()),
    };
    if let Some(value) = non_finite {
        return Err(ValidationError::InvalidValue {
            field: format!("profile '{}' value", profile.id),
            value: value.to_string(),
            reason: "control values must be finite".to_string(),
        });
    }
    Ok(())
}
