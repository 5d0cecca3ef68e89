use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio::sync::Mutex;

use super::models::Session;

/// A session shared between requests. Hold the lock for the whole
/// turn so concurrent requests for the same id run one at a time.
pub type SessionHandle = Arc<Mutex<Session>>;

/// In-memory map of session id to session.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session for `id`, creating an empty one if this is
    /// the first time the id has been seen.
    pub fn get_or_create(&self, id: &str) -> SessionHandle {
        if let Some(handle) = self.get(id) {
            return handle;
        }
        let mut sessions = self.sessions.write().expect("Session store lock poisoned");
        // Another request may have created it between the read and write
        Arc::clone(
            sessions
                .entry(id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(Session::new(id)))),
        )
    }

    pub fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions
            .read()
            .expect("Session store lock poisoned")
            .get(id)
            .map(Arc::clone)
    }

    /// Drops every session. Requests already holding a handle finish
    /// against the detached session.
    pub fn clear_all(&self) {
        self.sessions
            .write()
            .expect("Session store lock poisoned")
            .clear();
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .expect("Session store lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::models::Message;
    use crate::openai::Role;

    #[tokio::test]
    async fn test_get_or_create_returns_same_session() {
        let store = SessionStore::new();
        let first = store.get_or_create("user-1");
        first.lock().await.messages.push(Message::new(Role::User, "hi"));

        let second = store.get_or_create("user-1");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.lock().await.messages.len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_all_resets_store() {
        let store = SessionStore::new();
        store
            .get_or_create("user-1")
            .lock()
            .await
            .messages
            .push(Message::new(Role::User, "hi"));
        store.get_or_create("user-2");

        store.clear_all();
        assert!(store.is_empty());
        assert!(store.get("user-1").is_none());

        let fresh = store.get_or_create("user-1");
        let session = fresh.lock().await;
        assert!(session.messages.is_empty());
        assert!(session.diagnosis.is_none());
        assert!(!session.completed);
    }
}
