//! A single global conversation with a bounded history window. Any
//! message can be edited and the conversation can be rewound to a
//! message and regenerated from there.

use anyhow::Result;
use serde_json::json;
use thiserror::Error;
use tokio::sync::Mutex;

use super::models::Message;
use crate::ai::prompt::{Prompt, render, transcript_context};
use crate::ai::{SharedInference, generate_or_fallback};
use crate::openai::Role;

/// Maximum number of non-system messages kept in the conversation
pub const WINDOW_SIZE: usize = 10;

const GREETINGS: [&str; 2] = [
    "Hello! I'm here to listen and support you.",
    "How are you feeling today?",
];

#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("Message {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Clone, Debug)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// A conversation holding only the system prompt and the canned
    /// greetings.
    pub fn seeded(system_message: &str) -> Self {
        let mut messages = vec![Message::new(Role::System, system_message)];
        messages.extend(GREETINGS.iter().map(|g| Message::new(Role::Assistant, g)));
        Self { messages }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Evicts the oldest non-system messages until at most
    /// `WINDOW_SIZE` remain. System messages are never evicted.
    pub fn trim_to_window(&mut self) {
        let mut non_system = self
            .messages
            .iter()
            .filter(|m| m.role != Role::System)
            .count();
        while non_system > WINDOW_SIZE {
            match self.messages.iter().position(|m| m.role != Role::System) {
                Some(idx) => {
                    self.messages.remove(idx);
                    non_system -= 1;
                }
                None => break,
            }
        }
    }

    /// Replaces the content of message `id` in place.
    pub fn update(&mut self, id: &str, content: &str) -> Result<(), ConversationError> {
        let message = self
            .messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| ConversationError::NotFound(id.to_string()))?;
        message.content = content.to_string();
        Ok(())
    }

    /// Drops every message after `id`, keeping `id` itself.
    pub fn truncate_after(&mut self, id: &str) -> Result<(), ConversationError> {
        let idx = self
            .messages
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| ConversationError::NotFound(id.to_string()))?;
        self.messages.truncate(idx + 1);
        Ok(())
    }

    fn system_prompt(&self) -> Option<&str> {
        self.messages
            .first()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
    }

    fn prompt(&self) -> Result<String> {
        let context = transcript_context(
            self.messages
                .iter()
                .filter(|m| m.role != Role::System)
                .map(|m| (m.role, m.content.as_str())),
        );
        render(Prompt::WindowedReply, &json!({ "context": context }))
    }
}

pub struct WindowedChat {
    backend: SharedInference,
    system_message: String,
    conversation: Mutex<Conversation>,
}

impl WindowedChat {
    pub fn new(backend: SharedInference, system_message: &str) -> Self {
        Self {
            backend,
            system_message: system_message.to_string(),
            conversation: Mutex::new(Conversation::seeded(system_message)),
        }
    }

    /// Adds the user's message and the model's reply. Returns the reply
    /// text and the id assigned to it.
    pub async fn append_and_respond(&self, user_text: &str) -> Result<(String, String)> {
        let mut conversation = self.conversation.lock().await;
        let mut working = conversation.clone();
        working.push(Message::new(Role::User, user_text));
        working.trim_to_window();

        let reply = self.reply(&mut working).await?;
        *conversation = working;
        Ok(reply)
    }

    pub async fn update_message(&self, id: &str, content: &str) -> Result<(), ConversationError> {
        self.conversation.lock().await.update(id, content)
    }

    /// Rewinds the conversation to message `id` and asks the model for
    /// a new reply from that point.
    pub async fn regenerate_after(&self, id: &str) -> Result<(String, String), ConversationError> {
        let mut conversation = self.conversation.lock().await;
        let mut working = conversation.clone();
        working.truncate_after(id)?;
        working.trim_to_window();

        let reply = self.reply(&mut working).await?;
        *conversation = working;
        Ok(reply)
    }

    pub async fn clear(&self) {
        *self.conversation.lock().await = Conversation::seeded(&self.system_message);
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.conversation.lock().await.messages().to_vec()
    }

    async fn reply(&self, conversation: &mut Conversation) -> Result<(String, String)> {
        let prompt = conversation.prompt()?;
        let system = conversation
            .system_prompt()
            .unwrap_or(self.system_message.as_str())
            .to_string();
        let text = generate_or_fallback(self.backend.as_ref(), &system, &prompt).await;
        let message = Message::new(Role::Assistant, &text);
        let id = message.id.clone();
        conversation.push(message);
        Ok((text, id))
    }
}
