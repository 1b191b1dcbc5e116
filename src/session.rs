//! In-memory session history
//!
//! Keyed by the client-supplied session id. Bounded per session, nothing is
//! written to disk, everything is gone on restart.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::provider::Message;

pub struct SessionStore {
    cap: usize,
    sessions: RwLock<HashMap<String, Vec<Message>>>,
}

impl SessionStore {
    /// `cap` is the number of messages (not turns) kept per session.
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// History for a session, oldest first. Unknown ids yield an empty list.
    pub async fn history(&self, session_id: &str) -> Vec<Message> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Record one completed turn, trimming the oldest messages past the cap.
    pub async fn append(&self, session_id: &str, user: &str, assistant: &str) {
        let mut sessions = self.sessions.write().await;
        let history = sessions.entry(session_id.to_string()).or_default();

        history.push(Message::user(user));
        history.push(Message::assistant(assistant));

        let excess = history.len().saturating_sub(self.cap);
        if excess > 0 {
            history.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MessageRole;

    #[tokio::test]
    async fn test_unknown_session_is_empty() {
        let store = SessionStore::new(20);
        assert!(store.history("nobody").await.is_empty());
    }

    #[tokio::test]
    async fn test_append_and_history_roundtrip() {
        let store = SessionStore::new(20);
        store.append("s1", "hello", "hi!").await;

        let history = store.history("s1").await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, MessageRole::User);
        assert_eq!(history[0].content, "hello");
        assert_eq!(history[1].role, MessageRole::Assistant);
        assert_eq!(history[1].content, "hi!");
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new(20);
        store.append("a", "from a", "reply a").await;
        store.append("b", "from b", "reply b").await;

        assert_eq!(store.history("a").await.len(), 2);
        assert_eq!(store.history("b").await[0].content, "from b");
    }

    #[tokio::test]
    async fn test_cap_drops_oldest() {
        let store = SessionStore::new(4);
        store.append("s", "turn 1", "reply 1").await;
        store.append("s", "turn 2", "reply 2").await;
        store.append("s", "turn 3", "reply 3").await;

        let history = store.history("s").await;
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].content, "turn 2");
        assert_eq!(history[3].content, "reply 3");
    }
}
