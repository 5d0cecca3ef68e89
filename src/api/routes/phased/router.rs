//! Router for the phase based chat API

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::{get, post},
};

use super::public;
use crate::api::public::ApiError;
use crate::chat::PhasedChat;

type SharedState = Arc<PhasedChat>;

/// Add a message to the caller's session and return the reply
async fn chat_handler(
    State(chat): State<SharedState>,
    payload: Result<Json<public::ChatRequest>, JsonRejection>,
) -> Result<Json<public::ChatResponse>, ApiError> {
    let Json(payload) = payload?;
    let key = match payload.session_key() {
        Some(key) if !payload.message.is_empty() => key,
        _ => {
            return Err(ApiError::Validation(String::from(
                "Missing message or user ID",
            )));
        }
    };

    let response = chat.respond(&key, &payload.message).await?;

    Ok(Json(public::ChatResponse {
        response,
        id: payload.id,
    }))
}

/// Drop every session
async fn clear_handler(State(chat): State<SharedState>) -> Json<public::ClearResponse> {
    chat.clear();
    tracing::info!("All sessions cleared");
    Json(public::ClearResponse {
        response: String::from("All sessions have been cleared."),
    })
}

/// Get the current state of a single session
async fn session_handler(
    State(chat): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<public::SessionView>, ApiError> {
    let handle = chat
        .sessions()
        .get(&id)
        .ok_or_else(|| ApiError::NotFound(format!("Session {} not found", id)))?;
    let session = handle.lock().await;
    Ok(Json(public::SessionView::from(&*session)))
}

/// Create the phase based chat router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/clear", post(clear_handler))
        .route("/sessions/{id}", get(session_handler))
}
