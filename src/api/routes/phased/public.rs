//! Public types for the phase based chat API
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chat::{Diagnosis, Message, Phase, Session};

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ChatRequest {
    pub message: String,
    /// Any JSON string or number, echoed back as given
    pub id: Value,
}

impl ChatRequest {
    /// The session key for `id`. Empty strings, zero and non-scalar
    /// values don't identify a session.
    pub fn session_key(&self) -> Option<String> {
        match &self.id {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub id: Value,
}

#[derive(Serialize, Deserialize)]
pub struct ClearResponse {
    pub response: String,
}

#[derive(Serialize)]
pub struct SessionView {
    pub id: String,
    pub messages: Vec<Message>,
    pub diagnosis: Option<Diagnosis>,
    pub strategies: Vec<String>,
    pub completed: bool,
    pub phase: Phase,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            messages: session.messages.clone(),
            diagnosis: session.diagnosis.clone(),
            strategies: session.therapy_plan.strategies.clone(),
            completed: session.completed,
            phase: session.phase(),
        }
    }
}
