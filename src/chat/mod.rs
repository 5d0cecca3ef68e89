pub mod models;
pub mod phased;
pub mod store;
pub mod windowed;

pub use models::{Diagnosis, Message, Phase, Session, TherapyPlan, UserProfile};
pub use phased::PhasedChat;
pub use store::{SessionHandle, SessionStore};
pub use windowed::{Conversation, ConversationError, WindowedChat};
