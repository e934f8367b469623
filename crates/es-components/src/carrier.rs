//! Energy carrier tags.
//!
//! Carriers label the energy flows of a component (hydrogen, ammonia, electricity,
//! ...). They are bookkeeping and display data only; the physics never reads them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyCarrier {
    pub name: String,
    /// Display color as hex code, e.g. "#1982a8".
    pub color: String,
    /// Lower heating value [kWh/kg]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hu_kwh_per_kg: Option<f64>,
    /// Density in liquid state at ambient pressure [kg/m³]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density_kg_per_m3: Option<f64>,
}

impl EnergyCarrier {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            hu_kwh_per_kg: None,
            density_kg_per_m3: None,
        }
    }

    pub fn with_heating_value(mut self, hu_kwh_per_kg: f64) -> Self {
        self.hu_kwh_per_kg = Some(hu_kwh_per_kg);
        self
    }

    pub fn with_density(mut self, density_kg_per_m3: f64) -> Self {
        self.density_kg_per_m3 = Some(density_kg_per_m3);
        self
    }

    /// Volumetric energy density [kWh/m³], when both properties are known.
    pub fn vol_energy_density(&self) -> Option<f64> {
        Some(self.hu_kwh_per_kg? * self.density_kg_per_m3?)
    }

    /// Whether `color` is a `#rrggbb` hex code.
    pub fn has_valid_color(&self) -> bool {
        let c = self.color.as_bytes();
        c.len() == 7 && c[0] == b'#' && c[1..].iter().all(|b| b.is_ascii_hexdigit())
    }
}

impl Default for EnergyCarrier {
    fn default() -> Self {
        Self::new("Unspecified", "#808080")
    }
}

/// Carriers attached to the four flow paths of a component.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CarrierSet {
    pub in_mc: EnergyCarrier,
    pub in_sd1: EnergyCarrier,
    pub in_sd2: EnergyCarrier,
    pub out: EnergyCarrier,
}

impl CarrierSet {
    /// Same carrier on every path (e.g. an electric battery).
    pub fn uniform(carrier: EnergyCarrier) -> Self {
        Self {
            in_mc: carrier.clone(),
            in_sd1: carrier.clone(),
            in_sd2: carrier.clone(),
            out: carrier,
        }
    }
}
