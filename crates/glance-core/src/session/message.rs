//! Conversation turn types.
//!
//! This module contains types for representing the messages in a session,
//! including speaker roles and message content.

use serde::{Deserialize, Serialize};

/// Represents the speaker of a turn in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// Turn authored by the user.
    User,
    /// Turn authored by the AI assistant.
    Assistant,
}

/// A single message in a session's conversation history.
///
/// Each turn has a role (user or assistant), text content, and a
/// timestamp indicating when it was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// The role of the turn's author.
    pub role: TurnRole,
    /// The text content of the turn.
    pub content: String,
    /// Timestamp when the turn was recorded (RFC 3339 format).
    pub timestamp: String,
}

impl Turn {
    /// Creates a user turn stamped with the current time.
    pub fn user(content: impl Into<String>) -> Self {
        Self::stamped(TurnRole::User, content)
    }

    /// Creates an assistant turn stamped with the current time.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::stamped(TurnRole::Assistant, content)
    }

    fn stamped(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
