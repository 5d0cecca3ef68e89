//! Client for OpenAI compatible chat completion APIs

mod core;
mod error;

pub use self::core::{CompletionTarget, Message, Role, completion, completion_payload};
pub use error::{CONNECTION_FALLBACK, InferenceError, PROCESSING_FALLBACK};
