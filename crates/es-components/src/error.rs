//! Error types for component operations.

use es_core::error::EsError;
use thiserror::Error;

/// Errors that can occur while building or stepping a component.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    /// Parameter set rejected at construction time.
    #[error("Invalid configuration for '{component}': {what}")]
    InvalidConfig { component: String, what: String },

    /// Sample table of an interpolation curve is malformed.
    #[error("Invalid curve '{curve}': {what}")]
    Curve { curve: &'static str, what: String },

    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Not supported: {what}")]
    NotSupported { what: &'static str },

    /// Lookup argument outside the valid operating range.
    #[error("{what} = {value} outside valid range [{min}, {max}]")]
    OutOfRange {
        what: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Convergence failed: {what} (after {iterations} iterations)")]
    ConvergenceFailed {
        what: &'static str,
        iterations: usize,
    },

    /// Storage content would leave [0, capacity] and auto-increase is off.
    #[error("Storage '{name}' overflow: content {content} kWh outside [0, {capacity}] kWh")]
    StorageOverflow {
        name: String,
        content: f64,
        capacity: f64,
    },

    #[error("Power limit exceeded: {what} ({value} kW > {limit} kW)")]
    PowerLimit {
        what: &'static str,
        value: f64,
        limit: f64,
    },

    /// Raised only under the strict balance policy.
    #[error("Energy balance violated: {what} residual {residual} exceeds {tolerance}")]
    BalanceViolation {
        what: &'static str,
        residual: f64,
        tolerance: f64,
    },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl ComponentError {
    pub(crate) fn config(component: &str, what: impl Into<String>) -> Self {
        ComponentError::InvalidConfig {
            component: component.to_string(),
            what: what.into(),
        }
    }
}

impl From<EsError> for ComponentError {
    fn from(e: EsError) -> Self {
        match e {
            EsError::NonFinite { what, .. } => ComponentError::NonPhysical { what },
            EsError::InvalidArg { what } => ComponentError::InvalidArg { what },
            EsError::Invariant { what } => ComponentError::InvalidArg { what },
        }
    }
}

impl From<ComponentError> for EsError {
    fn from(e: ComponentError) -> Self {
        match e {
            ComponentError::NonPhysical { what } => EsError::InvalidArg { what },
            ComponentError::NotSupported { what } => EsError::InvalidArg { what },
            ComponentError::InvalidArg { what } => EsError::InvalidArg { what },
            ComponentError::BalanceViolation { what, .. } => EsError::Invariant { what },
            ComponentError::ConvergenceFailed { what, .. } => EsError::Invariant { what },
            ComponentError::OutOfRange { what, .. } => EsError::InvalidArg { what },
            ComponentError::PowerLimit { what, .. } => EsError::InvalidArg { what },
            ComponentError::InvalidConfig { .. } | ComponentError::Curve { .. } => {
                EsError::InvalidArg {
                    what: "invalid component configuration",
                }
            }
            ComponentError::StorageOverflow { .. } => EsError::Invariant {
                what: "storage content within capacity",
            },
        }
    }
}
