//! Chat message data structures

use serde::{Deserialize, Serialize};

/// Id of the synthetic greeting that seeds every fresh session
pub const WELCOME_MESSAGE_ID: &str = "welcome";

/// Greeting text of the welcome message
pub const DEFAULT_WELCOME_MESSAGE: &str =
    "Hello! I'm your marketing assistant. Ask me about campaign performance, \
     customer insights, or social analytics and I'll help you dig in.";

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message held by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Caller-supplied id, unique within a session
    pub id: String,
    /// Message role
    pub role: Role,
    /// Message content
    pub content: String,
    /// Milliseconds since the Unix epoch, assigned by the store on append
    pub timestamp: i64,
}

impl ChatMessage {
    /// Build the welcome message stamped with `timestamp`
    pub fn welcome(id: impl Into<String>, content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id: id.into(),
            role: Role::Assistant,
            content: content.into(),
            timestamp,
        }
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

/// A message submitted by a caller; the store assigns the timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
}

impl NewMessage {
    /// Create a new message
    pub fn new(id: impl Into<String>, role: Role, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(id, Role::User, content)
    }

    /// Create an assistant message
    pub fn assistant(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(id, Role::Assistant, content)
    }

    pub(crate) fn stamp(self, timestamp: i64) -> ChatMessage {
        ChatMessage {
            id: self.id,
            role: self.role,
            content: self.content,
            timestamp,
        }
    }
}
