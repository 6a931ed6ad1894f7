//! Error types for the job substrate.

use thiserror::Error;

use crate::tree::JobTreeId;
use crate::workflow::Stage;

/// Errors from workflow execution and job bookkeeping.
#[derive(Error, Debug)]
pub enum JobsError {
    #[error("Stage {stage} failed: {message}")]
    StageFailed { stage: Stage, message: String },

    #[error("Job tree not found: {id}")]
    TreeNotFound { id: JobTreeId },

    #[error("Queue is shut down")]
    QueueClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type JobsResult<T> = Result<T, JobsError>;
