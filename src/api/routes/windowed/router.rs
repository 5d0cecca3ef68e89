//! Router for the windowed conversation API

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};

use super::public;
use crate::ai::crisis::{self, CRISIS_RESPONSE};
use crate::api::public::ApiError;
use crate::chat::WindowedChat;

type SharedState = Arc<WindowedChat>;

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::Validation(format!("Missing {}", field)))
}

/// Add a user message to the conversation and return the reply
async fn chat_handler(
    State(chat): State<SharedState>,
    payload: Result<Json<public::ChatRequest>, JsonRejection>,
) -> Result<Json<public::ChatResponse>, ApiError> {
    let Json(payload) = payload?;
    if payload.message.is_empty() {
        return Err(ApiError::Validation(String::from("Missing message")));
    }

    if crisis::detect(&payload.message) {
        tracing::warn!("Crisis language detected, skipping model");
        return Ok(Json(public::ChatResponse {
            response: CRISIS_RESPONSE.to_string(),
            id: None,
        }));
    }

    let (response, id) = chat.append_and_respond(&payload.message).await?;
    Ok(Json(public::ChatResponse {
        response,
        id: Some(id),
    }))
}

/// Edit the content of an existing message
async fn update_message_handler(
    State(chat): State<SharedState>,
    payload: Result<Json<public::UpdateMessageRequest>, JsonRejection>,
) -> Result<Json<public::StatusResponse>, ApiError> {
    let Json(payload) = payload?;
    let id = required(payload.id, "id")?;
    let content = payload
        .content
        .ok_or_else(|| ApiError::Validation(String::from("Missing content")))?;

    chat.update_message(&id, &content).await?;

    Ok(Json(public::StatusResponse {
        status: String::from("success"),
    }))
}

/// Drop everything after a message and generate a new reply
async fn regenerate_after_handler(
    State(chat): State<SharedState>,
    payload: Result<Json<public::RegenerateRequest>, JsonRejection>,
) -> Result<Json<public::ChatResponse>, ApiError> {
    let Json(payload) = payload?;
    let id = required(payload.id, "id")?;

    let (response, new_id) = chat.regenerate_after(&id).await?;
    Ok(Json(public::ChatResponse {
        response,
        id: Some(new_id),
    }))
}

async fn clear_handler(State(chat): State<SharedState>) -> Json<public::ClearResponse> {
    chat.clear().await;
    tracing::info!("Conversation reset");
    Json(public::ClearResponse {
        response: String::from("Conversation has been cleared."),
    })
}

async fn messages_handler(State(chat): State<SharedState>) -> Json<public::MessagesResponse> {
    Json(public::MessagesResponse {
        messages: chat.messages().await,
    })
}

/// Create the windowed conversation router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/update_message", post(update_message_handler))
        .route("/regenerate_after", post(regenerate_after_handler))
        .route("/clear", post(clear_handler))
        .route("/messages", get(messages_handler))
}
