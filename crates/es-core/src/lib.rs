//! es-core: stable foundation for energysys.
//!
//! Contains:
//! - units (uom time type + minute constructors)
//! - numeric (Real + tolerances + float helpers + control normalization)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{EsError, EsResult};
pub use numeric::*;
pub use units::*;
