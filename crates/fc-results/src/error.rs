use std::path::PathBuf;

use thiserror::Error;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(Error, Debug)]
pub enum ResultsError {
    #[error("Result file not found: {path}")]
    ResultNotFound { path: PathBuf },

    #[error("Malformed result file {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
