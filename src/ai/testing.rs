//! In-memory inference backend for tests. Returns queued responses in
//! order and records every prompt it receives.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::gateway::Inference;
use crate::openai::InferenceError;

#[derive(Default)]
pub struct ScriptedInference {
    responses: Mutex<VecDeque<Result<String, InferenceError>>>,
    always_fail: bool,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedInference {
    /// Responds with `responses` in order, then with `Reply N` where N
    /// counts every call made so far.
    pub fn new(responses: Vec<Result<String, InferenceError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            ..Default::default()
        }
    }

    /// Fails every call as if the backend were unreachable.
    pub fn failing() -> Self {
        Self {
            always_fail: true,
            ..Default::default()
        }
    }

    pub fn push_response(&self, response: Result<String, InferenceError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, prompt)| prompt.clone())
            .collect()
    }

    pub fn systems(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(system, _)| system.clone())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Inference for ScriptedInference {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, InferenceError> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((system.to_string(), prompt.to_string()));
            calls.len()
        };
        if self.always_fail {
            return Err(InferenceError::Timeout(30));
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("Reply {}", call_number)))
    }
}
