//! Error types for simulation runs.

use es_components::ComponentError;
use thiserror::Error;

/// Errors encountered while driving a component over a profile.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Profile and component disagree on the step length.
    #[error("Timestep mismatch: profile {profile_min} min, component {component_min} min")]
    TimestepMismatch { profile_min: f64, component_min: f64 },

    #[error("Step {step} failed: {source}")]
    Step {
        step: usize,
        #[source]
        source: ComponentError,
    },

    #[error("Component error: {0}")]
    Component(#[from] ComponentError),
}

pub type SimResult<T> = Result<T, SimError>;
