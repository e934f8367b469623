//! Shared application service layer for energysys.
//!
//! Both the CLI and any other front end go through these services for project
//! handling, cached simulation runs and result export.

pub mod error;
pub mod project_service;
pub mod run_service;

pub use error::{AppError, AppResult};
pub use project_service::{
    ComponentKind, ComponentRef, ComponentSummary, find_component, find_profile, list_components,
    load_profile, load_project, save_project, validate_project,
};
pub use run_service::{
    ENGINE_VERSION, RunMode, RunOptions, RunRequest, RunResponse, ensure_run, export_csv,
    final_values, list_runs, load_run,
};
