//! Workflow client error types.

use pillcount_media::MediaError;
use thiserror::Error;

pub type WorkflowResult<T> = Result<T, WorkflowError>;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Failed to stage image: {0}")]
    Staging(#[from] std::io::Error),

    #[error("Failed to encode image: {0}")]
    Encode(#[from] MediaError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Workflow returned {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl WorkflowError {
    /// True when the failure happened locally, before anything was sent.
    pub fn is_local(&self) -> bool {
        matches!(self, WorkflowError::Staging(_) | WorkflowError::Encode(_))
    }
}
