//! API routes module

pub mod phased;
pub mod windowed;

use std::sync::Arc;

use axum::Router;

use crate::ai::SharedInference;
use crate::chat::{PhasedChat, WindowedChat};
use crate::core::{AppConfig, ChatVariant};

/// Create the API router for the configured conversation variant.
/// Each variant owns its own state so only one is ever live.
pub fn router(config: &AppConfig, backend: SharedInference) -> Router {
    match config.variant {
        ChatVariant::Phased => {
            phased::router().with_state(Arc::new(PhasedChat::new(backend, &config.system_message)))
        }
        ChatVariant::Windowed => windowed::router()
            .with_state(Arc::new(WindowedChat::new(backend, &config.system_message))),
    }
}
