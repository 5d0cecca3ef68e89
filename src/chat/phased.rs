//! Phase based conversations: one session per caller id that moves
//! from active to diagnosed to concluded as messages accumulate.

use anyhow::Result;
use serde_json::json;

use super::models::{Diagnosis, Message, Session};
use super::store::SessionStore;
use crate::ai::crisis::{self, CRISIS_RESPONSE};
use crate::ai::diagnosis::{coping_strategies, diagnose};
use crate::ai::prompt::{Prompt, render, transcript_context};
use crate::ai::{SharedInference, generate_or_fallback};
use crate::openai::Role;

/// Message count (both roles) at which a diagnosis is formed
pub const DIAGNOSIS_THRESHOLD: usize = 5;

/// Message count (both roles) at which the session concludes
pub const CONCLUSION_THRESHOLD: usize = 10;

pub const CONCLUSION_NOTICE: &str = "\n\n### Session Conclusion\n*It seems we have covered a lot today. Would you like to explore further strategies or schedule another session?*";

pub struct PhasedChat {
    backend: SharedInference,
    system_message: String,
    sessions: SessionStore,
}

impl PhasedChat {
    pub fn new(backend: SharedInference, system_message: &str) -> Self {
        Self {
            backend,
            system_message: system_message.to_string(),
            sessions: SessionStore::new(),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handles one user message for session `id` and returns the text
    /// to show the user. High-risk messages get the crisis response
    /// without creating or touching the session.
    pub async fn respond(&self, id: &str, user_text: &str) -> Result<String> {
        if crisis::detect(user_text) {
            tracing::warn!(session_id = %id, "Crisis language detected, skipping model");
            return Ok(CRISIS_RESPONSE.to_string());
        }

        let handle = self.sessions.get_or_create(id);
        let mut session = handle.lock().await;
        self.turn(&mut session, user_text).await
    }

    /// Runs a single turn against `session`. The session is only
    /// updated once the whole turn succeeds, so a failure leaves it
    /// exactly as it was.
    pub async fn turn(&self, session: &mut Session, user_text: &str) -> Result<String> {
        let backend = self.backend.as_ref();
        let mut messages = session.messages.clone();
        messages.push(Message::new(Role::User, user_text));

        let mut diagnosis = session.diagnosis.clone();
        let mut strategies = None;
        if messages.len() >= DIAGNOSIS_THRESHOLD && diagnosis.is_none() {
            let formed = diagnose(backend, &self.system_message, &messages).await?;
            strategies = Some(coping_strategies(backend, &self.system_message, &formed).await?);
            tracing::info!(
                session_id = %session.id,
                severity = formed.severity,
                confidence = formed.confidence,
                "Session diagnosed"
            );
            diagnosis = Some(formed);
        }

        let prompt = reply_prompt(&messages, diagnosis.as_ref())?;
        let mut reply = generate_or_fallback(backend, &self.system_message, &prompt).await;
        messages.push(Message::new(Role::Assistant, &reply));

        session.messages = messages;
        session.diagnosis = diagnosis;
        if let Some(strategies) = strategies {
            session.therapy_plan.strategies = strategies;
        }

        if session.messages.len() >= CONCLUSION_THRESHOLD && !session.completed {
            session.completed = true;
            tracing::info!(session_id = %session.id, "Session concluded");
            // Only the outgoing text carries the notice
            reply.push_str(CONCLUSION_NOTICE);
        }

        Ok(reply)
    }

    pub fn clear(&self) {
        self.sessions.clear_all();
    }
}

fn reply_prompt(messages: &[Message], diagnosis: Option<&Diagnosis>) -> Result<String> {
    let context = transcript_context(messages.iter().map(|m| (m.role, m.content.as_str())));
    match diagnosis {
        Some(d) => render(
            Prompt::DiagnosedReply,
            &json!({
                "context": context,
                "conditions": d.conditions,
                "severity": d.severity,
            }),
        ),
        None => render(Prompt::Reply, &json!({ "context": context })),
    }
}
