//! Public API types

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;
use thiserror::Error;

use crate::chat::ConversationError;

// Errors

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request is missing something it needs
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Unexpected(e) => {
                // Detail stays in the logs
                tracing::error!("Unexpected error: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    String::from("Something went wrong on the server"),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<ConversationError> for ApiError {
    fn from(err: ConversationError) -> Self {
        match err {
            ConversationError::NotFound(_) => ApiError::NotFound(err.to_string()),
            ConversationError::Other(e) => ApiError::Unexpected(e),
        }
    }
}

// Re-export public types from each route

pub mod phased {
    pub use crate::api::routes::phased::public::*;
}

pub mod windowed {
    pub use crate::api::routes::windowed::public::*;
}
