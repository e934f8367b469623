//! Core traits for component models.

use crate::error::ComponentResult;
use es_core::units::Time;

/// A state that can be exported as a flat row of named numbers.
///
/// Field names and values come out in the same, fixed order so rows from
/// consecutive steps line up as table columns.
pub trait FlatRecord {
    /// Column names in export order.
    fn field_names() -> &'static [&'static str]
    where
        Self: Sized;

    /// Values in the order of [`FlatRecord::field_names`].
    fn field_values(&self) -> Vec<f64>;

    /// Name/value pairs for this state.
    fn to_pairs(&self) -> Vec<(&'static str, f64)>
    where
        Self: Sized,
    {
        Self::field_names()
            .iter()
            .copied()
            .zip(self.field_values())
            .collect()
    }
}

/// Trait for time-stepped components driven by a single scalar control value.
///
/// A component owns its current state and advances it by exactly one fixed
/// timestep per [`EnergyComponent::apply`] call.
pub trait EnergyComponent: Send {
    type State: Clone + FlatRecord;

    /// Component name for logging and identification.
    fn name(&self) -> &str;

    /// Fixed simulation timestep.
    fn timestep(&self) -> Time;

    /// Current state.
    fn state(&self) -> &Self::State;

    /// Advance one timestep towards `control`.
    ///
    /// For conversion components the control value is a normalized output target,
    /// for storage components the requested energy (positive charges).
    fn apply(&mut self, control: f64) -> ComponentResult<()>;

    /// Restore the state the component was constructed with.
    fn reset(&mut self);

    /// Current state as name/value pairs.
    fn record(&self) -> Vec<(&'static str, f64)> {
        self.state().to_pairs()
    }
}
