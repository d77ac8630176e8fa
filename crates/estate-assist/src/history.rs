//! Bounded per-session chat history.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub user: String,
    pub bot: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    pub fn new(user: impl Into<String>, bot: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            bot: bot.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Per-session history store. Sessions are isolated; a turn appended to
/// one session is never visible from another.
pub trait SessionStore: Send + Sync {
    /// Turns for `session_id`, oldest first. Unknown sessions are empty.
    fn history(&self, session_id: &str) -> Vec<ChatTurn>;

    /// Append a turn, dropping the oldest entries beyond the cap.
    fn append(&self, session_id: &str, turn: ChatTurn);
}

/// In-memory store; state lives for the process lifetime only.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Vec<ChatTurn>>>,
    cap: usize,
}

impl InMemorySessionStore {
    pub fn new(cap: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            cap,
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn history(&self, session_id: &str) -> Vec<ChatTurn> {
        self.sessions
            .read()
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    fn append(&self, session_id: &str, turn: ChatTurn) {
        let mut sessions = self.sessions.write();
        let turns = sessions.entry(session_id.to_string()).or_default();
        turns.push(turn);
        if turns.len() > self.cap {
            let remove_count = turns.len() - self.cap;
            turns.drain(0..remove_count);
        }
    }
}
