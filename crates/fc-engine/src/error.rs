//! Error types for the engine service layer.

use thiserror::Error;

/// Unified error surface of the simulation engine, wrapping errors from the
/// backend crates.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Unknown discrete-variable combination")]
    UnknownBucket,

    #[error("Unknown simulationId")]
    UnknownSimulationId,

    #[error("Estimation error: {0}")]
    Estimation(String),

    #[error("Job error: {0}")]
    Jobs(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

// Conversions from backend error types
impl From<fc_core::CoreError> for EngineError {
    fn from(err: fc_core::CoreError) -> Self {
        EngineError::Validation {
            message: err.to_string(),
        }
    }
}

impl From<fc_approx::ApproxError> for EngineError {
    fn from(err: fc_approx::ApproxError) -> Self {
        EngineError::Estimation(err.to_string())
    }
}

impl From<fc_jobs::JobsError> for EngineError {
    fn from(err: fc_jobs::JobsError) -> Self {
        EngineError::Jobs(err.to_string())
    }
}

impl From<fc_results::ResultsError> for EngineError {
    fn from(err: fc_results::ResultsError) -> Self {
        EngineError::Results(err.to_string())
    }
}
