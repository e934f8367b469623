//! Carrier lookup by id.

use crate::schema::{CarrierRefs, Project};
use crate::validate::ValidationError;
use es_components::{CarrierSet, EnergyCarrier};
use std::collections::HashMap;

/// Carriers of a project, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct CarrierRegistry {
    carriers: HashMap<String, EnergyCarrier>,
}

impl CarrierRegistry {
    pub fn from_project(project: &Project) -> Self {
        Self {
            carriers: project
                .carriers
                .iter()
                .map(|c| (c.id.clone(), c.carrier.clone()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.carriers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carriers.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.carriers.contains_key(id)
    }

    pub fn get(&self, id: &str, context: &str) -> Result<&EnergyCarrier, ValidationError> {
        self.carriers
            .get(id)
            .ok_or_else(|| ValidationError::MissingReference {
                id: id.to_string(),
                context: context.to_string(),
            })
    }

    /// Resolve the four carrier ids of a conversion component.
    pub fn resolve(&self, refs: &CarrierRefs, owner: &str) -> Result<CarrierSet, ValidationError> {
        let ctx = |path: &str| format!("conversion '{owner}' carrier {path}");
        Ok(CarrierSet {
            in_mc: self.get(&refs.in_mc, &ctx("in_mc"))?.clone(),
            in_sd1: self.get(&refs.in_sd1, &ctx("in_sd1"))?.clone(),
            in_sd2: self.get(&refs.in_sd2, &ctx("in_sd2"))?.clone(),
            out: self.get(&refs.out, &ctx("out"))?.clone(),
        })
    }

    /// Same carrier on every path, as storages use.
    pub fn resolve_uniform(&self, id: &str, owner: &str) -> Result<CarrierSet, ValidationError> {
        let carrier = self.get(id, &format!("storage '{owner}' carrier"))?;
        Ok(CarrierSet::uniform(carrier.clone()))
    }
}
