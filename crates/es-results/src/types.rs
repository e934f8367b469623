//! Result data types.

use es_components::FlatRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub run_id: RunId,
    pub component_id: String,
    /// Driving profile; absent for stationary sweeps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    pub timestamp: String,
    pub run_type: RunType,
    pub engine_version: String,
    /// Value names in the component's export order
    #[serde(default)]
    pub columns: Vec<String>,
    /// Run-level figures such as summed energy flows [kWh]
    #[serde(default)]
    pub totals: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum RunType {
    /// Component driven over a load profile
    Profile { ts_min: f64, steps: usize },
    /// One stationary point per target
    Stationary { ts_min: f64, points: usize },
}

/// One flattened component state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeseriesRecord {
    pub step: usize,
    pub time_min: f64,
    pub values: BTreeMap<String, f64>,
}

impl TimeseriesRecord {
    pub fn from_state<S: FlatRecord>(step: usize, time_min: f64, state: &S) -> Self {
        Self {
            step,
            time_min,
            values: state
                .to_pairs()
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Add or overwrite one value.
    pub fn with_value(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), value);
        self
    }
}

/// Column names of state type `S` in export order.
pub fn columns_of<S: FlatRecord>() -> Vec<String> {
    S::field_names().iter().map(|n| n.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair(f64, f64);

    impl FlatRecord for Pair {
        fn field_names() -> &'static [&'static str] {
            &["SoC", "E_in"]
        }

        fn field_values(&self) -> Vec<f64> {
            vec![self.0, self.1]
        }
    }

    #[test]
    fn record_from_state() {
        let r = TimeseriesRecord::from_state(3, 45.0, &Pair(0.5, 2.0));
        assert_eq!(r.step, 3);
        assert_eq!(r.time_min, 45.0);
        assert_eq!(r.get("SoC"), Some(0.5));
        assert_eq!(r.get("E_in"), Some(2.0));
        assert_eq!(r.get("E_out"), None);
    }

    #[test]
    fn columns_keep_export_order() {
        assert_eq!(columns_of::<Pair>(), vec!["SoC", "E_in"]);
    }

    #[test]
    fn run_type_tagged() {
        let json = serde_json::to_string(&RunType::Stationary {
            ts_min: 1.0,
            points: 11,
        })
        .unwrap();
        assert!(json.contains("\"type\":\"Stationary\""));
    }

    #[test]
    fn manifest_without_optional_fields() {
        let json = r#"{
            "run_id": "abc",
            "component_id": "sofc",
            "timestamp": "2026-01-01T00:00:00Z",
            "run_type": {"type": "Profile", "ts_min": 1.0, "steps": 10},
            "engine_version": "0.1.0"
        }"#;
        let m: RunManifest = serde_json::from_str(json).unwrap();
        assert_eq!(m.profile_id, None);
        assert!(m.columns.is_empty());
        assert!(m.totals.is_empty());
    }
}
