//! Public types for the windowed conversation API
use serde::{Deserialize, Serialize};

use crate::chat::Message;

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ChatRequest {
    pub message: String,
    // Accepted for compatibility with the phased API. There is only one
    // conversation so it is ignored
    pub id: Option<String>,
}

/// `id` is the id of the generated assistant message, or null when
/// the message was answered by the crisis gate.
#[derive(Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub id: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateMessageRequest {
    pub id: Option<String>,
    pub content: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Deserialize)]
pub struct RegenerateRequest {
    pub id: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ClearResponse {
    pub response: String,
}

#[derive(Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
}
