//! Inference backend error types

use thiserror::Error;

/// User facing text returned in place of a completion when the backend
/// could not be reached.
pub const CONNECTION_FALLBACK: &str = "I'm having trouble connecting right now. Please try again.";

/// User facing text returned in place of a completion when the backend
/// answered with something that could not be used.
pub const PROCESSING_FALLBACK: &str =
    "I'm having trouble processing that right now. Please try again.";

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Request to inference backend failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Inference backend timed out after {0}s")]
    Timeout(u64),
    #[error("Inference backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Malformed response from inference backend: {0}")]
    MalformedResponse(String),
}

impl InferenceError {
    /// The text that stands in for the completion when this error
    /// occurs.
    pub fn fallback_text(&self) -> &'static str {
        match self {
            InferenceError::Transport(_)
            | InferenceError::Timeout(_)
            | InferenceError::Status { .. } => CONNECTION_FALLBACK,
            InferenceError::MalformedResponse(_) => PROCESSING_FALLBACK,
        }
    }
}
