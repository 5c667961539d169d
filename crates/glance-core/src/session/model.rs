//! Session domain model.
//!
//! This module contains the core Session entity that represents one
//! capture plus its chat exchange history.

use super::message::Turn;
use serde::{Deserialize, Serialize};

/// A persisted unit of one capture plus its chat exchange history.
///
/// A session is created when a capture completes, grows by appended turns
/// after each successful chat exchange, and is destroyed on explicit user
/// deletion. The panel's in-memory collection is authoritative; the stored
/// copy is a snapshot cache, never a second writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier (UUID format)
    pub id: String,
    /// Human-readable session title
    pub title: String,
    /// Timestamp when the session was created (RFC 3339 format)
    pub created_at: String,
    /// Timestamp when the session was last updated (RFC 3339 format)
    pub updated_at: String,
    /// Ordered conversation turns
    #[serde(default)]
    pub turns: Vec<Turn>,
}

impl Session {
    /// Creates an empty session with a fresh UUID and current timestamps.
    pub fn new() -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: "Captured region".to_string(),
            created_at: now.clone(),
            updated_at: now,
            turns: Vec::new(),
        }
    }

    /// Appends a turn and bumps `updated_at`.
    pub fn push_turn(&mut self, turn: Turn) {
        self.turns.push(turn);
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::message::TurnRole;

    #[test]
    fn test_new_session_has_unique_id_and_no_turns() {
        let a = Session::new();
        let b = Session::new();

        assert!(a.turns.is_empty());
        assert_ne!(a.id, b.id);
        assert!(uuid::Uuid::parse_str(&a.id).is_ok());
    }

    #[test]
    fn test_push_turn_appends_in_order() {
        let mut session = Session::new();

        session.push_turn(Turn::user("What do you see in this image?"));
        session.push_turn(Turn::assistant("A login form."));

        assert_eq!(session.turns.len(), 2);
        assert_eq!(session.turns[0].role, TurnRole::User);
        assert_eq!(session.turns[1].role, TurnRole::Assistant);
    }
}
