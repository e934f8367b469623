//! Project schema definitions.

use es_components::{EccParameterDef, EnergyCarrier, EscParameterDef};
use serde::{Deserialize, Serialize};

pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub carriers: Vec<CarrierDef>,
    #[serde(default)]
    pub conversions: Vec<ConversionDef>,
    #[serde(default)]
    pub storages: Vec<StorageDef>,
    #[serde(default)]
    pub profiles: Vec<ProfileDef>,
}

impl Project {
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            version: LATEST_VERSION,
            name: name.into(),
            carriers: vec![],
            conversions: vec![],
            storages: vec![],
            profiles: vec![],
        }
    }

    pub fn conversion(&self, id: &str) -> Option<&ConversionDef> {
        self.conversions.iter().find(|c| c.id == id)
    }

    pub fn storage(&self, id: &str) -> Option<&StorageDef> {
        self.storages.iter().find(|s| s.id == id)
    }

    pub fn profile(&self, id: &str) -> Option<&ProfileDef> {
        self.profiles.iter().find(|p| p.id == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CarrierDef {
    pub id: String,
    #[serde(flatten)]
    pub carrier: EnergyCarrier,
}

/// Carrier ids of the four flow paths of a conversion component.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CarrierRefs {
    pub in_mc: String,
    pub in_sd1: String,
    pub in_sd2: String,
    pub out: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversionDef {
    pub id: String,
    pub carriers: CarrierRefs,
    #[serde(default)]
    pub initial: InitialStateDef,
    #[serde(flatten)]
    pub parameter: EccParameterDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "type")]
pub enum InitialStateDef {
    #[default]
    Cold,
    /// Warm and running stationary at relative output `p_rel`
    Operating { p_rel: f64 },
}

fn default_soc() -> f64 {
    0.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageDef {
    pub id: String,
    pub carrier: String,
    #[serde(default = "default_soc")]
    pub soc_initial: f64,
    #[serde(flatten)]
    pub parameter: EscParameterDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileDef {
    pub id: String,
    pub name: String,
    /// Timestep [min]
    pub ts_min: f64,
    pub kind: ProfileKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ProfileKind {
    /// Same control value for every step
    Constant { value: f64, steps: usize },
    /// `value` for the first half of the steps, then 0
    HoldThenRelease { value: f64, steps: usize },
    /// Explicit control sequence
    Values { values: Vec<f64> },
}

impl ProfileKind {
    pub fn steps(&self) -> usize {
        match self {
            ProfileKind::Constant { steps, .. } | ProfileKind::HoldThenRelease { steps, .. } => {
                *steps
            }
            ProfileKind::Values { values } => values.len(),
        }
    }
}
