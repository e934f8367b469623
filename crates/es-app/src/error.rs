//! Error types for the es-app service layer.

/// Application error shared by all front ends.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(#[from] es_project::ProjectError),

    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Component error: {0}")]
    Component(#[from] es_components::ComponentError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] es_sim::SimError),

    #[error("Results error: {0}")]
    Results(#[from] es_results::ResultsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for es-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<es_project::ValidationError> for AppError {
    fn from(err: es_project::ValidationError) -> Self {
        AppError::Project(err.into())
    }
}
