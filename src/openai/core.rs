use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::error::InferenceError;
use crate::core::GenerationParams;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

impl Role {
    /// Capitalized name used when rendering a transcript into a prompt
    pub fn label(&self) -> &'static str {
        match self {
            Role::System => "System",
            Role::Assistant => "Assistant",
            Role::User => "User",
        }
    }
}

/// A message in the shape expected by the chat completions API.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: content.to_string(),
        }
    }
}

/// Everything needed to reach an OpenAI compatible completions
/// endpoint.
#[derive(Clone, Debug)]
pub struct CompletionTarget<'a> {
    pub api_hostname: &'a str,
    pub api_key: &'a str,
    pub model: &'a str,
    pub timeout: Duration,
}

pub fn completion_payload(
    messages: &[Message],
    model: &str,
    params: &GenerationParams,
) -> Value {
    json!({
        "model": model,
        "messages": messages,
        "max_tokens": params.max_tokens,
        "temperature": params.temperature,
        "top_k": params.top_k,
        "top_p": params.top_p,
        "repetition_penalty": params.repetition_penalty,
        "stop": params.stop,
        "stream": false,
    })
}

/// Sends a non-streaming chat completion request and returns the
/// trimmed content of the first choice.
pub async fn completion(
    messages: &[Message],
    params: &GenerationParams,
    target: &CompletionTarget<'_>,
) -> Result<String, InferenceError> {
    let payload = completion_payload(messages, target.model, params);
    let url = format!(
        "{}/v1/chat/completions",
        target.api_hostname.trim_end_matches("/")
    );
    let response = reqwest::Client::new()
        .post(url)
        .bearer_auth(target.api_key)
        .header("Content-Type", "application/json")
        .timeout(target.timeout)
        .json(&payload)
        .send()
        .await
        .map_err(|e| classify_transport(e, target.timeout))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| classify_transport(e, target.timeout))?;

    if !status.is_success() {
        return Err(InferenceError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let resp: Value = serde_json::from_str(&body)
        .map_err(|e| InferenceError::MalformedResponse(e.to_string()))?;

    resp["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| InferenceError::MalformedResponse(format!("No message received: {}", resp)))
}

fn classify_transport(err: reqwest::Error, timeout: Duration) -> InferenceError {
    if err.is_timeout() {
        InferenceError::Timeout(timeout.as_secs())
    } else {
        InferenceError::Transport(err)
    }
}
