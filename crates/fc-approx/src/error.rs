//! Error types for the estimation layer.

use thiserror::Error;

/// Errors from approximation models and error estimation.
#[derive(Error, Debug)]
pub enum ApproxError {
    #[error("No observations recorded")]
    NoObservations,

    #[error("Unknown source: {name}")]
    UnknownSource { name: String },

    #[error("Invalid observation: {message}")]
    InvalidObservation { message: String },
}

pub type ApproxResult<T> = Result<T, ApproxError>;

impl From<fc_core::CoreError> for ApproxError {
    fn from(e: fc_core::CoreError) -> Self {
        ApproxError::InvalidObservation {
            message: e.to_string(),
        }
    }
}
