pub mod crisis;
pub mod diagnosis;
pub mod gateway;
pub mod prompt;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use gateway::{Inference, OpenAiBackend, SharedInference, generate_or_fallback};
