//! Adapter between the conversation state machines and the inference
//! backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::core::{AppConfig, GenerationParams};
use crate::openai::{CompletionTarget, InferenceError, Message, Role, completion};

/// Anything that can turn a system instruction and a prompt into
/// generated text.
#[async_trait]
pub trait Inference: Send + Sync {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, InferenceError>;
}

pub type SharedInference = Arc<dyn Inference>;

/// Inference over an OpenAI compatible chat completions API.
pub struct OpenAiBackend {
    api_hostname: String,
    api_key: String,
    model: String,
    timeout: Duration,
    params: GenerationParams,
}

impl OpenAiBackend {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            api_hostname: config.llm_api_hostname.clone(),
            api_key: config.llm_api_key.clone(),
            model: config.llm_model.clone(),
            timeout: config.llm_timeout,
            params: config.generation.clone(),
        }
    }
}

#[async_trait]
impl Inference for OpenAiBackend {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, InferenceError> {
        let messages = vec![
            Message::new(Role::System, system),
            Message::new(Role::User, prompt),
        ];
        let target = CompletionTarget {
            api_hostname: &self.api_hostname,
            api_key: &self.api_key,
            model: &self.model,
            timeout: self.timeout,
        };
        let start = std::time::Instant::now();
        let result = completion(&messages, &self.params, &target).await;
        tracing::debug!(
            model = %self.model,
            duration_ms = %start.elapsed().as_millis(),
            ok = result.is_ok(),
            "Inference request finished"
        );
        result
    }
}

/// Calls the backend and swaps any failure for the matching fallback
/// text so callers always get something to show the user.
pub async fn generate_or_fallback(backend: &dyn Inference, system: &str, prompt: &str) -> String {
    match backend.generate(system, prompt).await {
        Ok(text) => text,
        Err(e) => {
            tracing::error!("Inference backend error: {}", e);
            e.fallback_text().to_string()
        }
    }
}
