//! Conversation log: append-only, chronologically ordered turns.
//! Used as context for the completion backend and exposed read-only to callers.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Speaker of a turn. Serialized as the chat-completion role name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
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

/// One message in the log. Fields are private so a turn cannot change after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    role: Role,
    text: String,
    at: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            at: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn at(&self) -> DateTime<Utc> {
        self.at
    }
}

/// Last `n` entries of a turn slice, or all of them when fewer exist.
pub fn tail(turns: &[Turn], n: usize) -> &[Turn] {
    &turns[turns.len().saturating_sub(n)..]
}

/// Ordered, unbounded turn log for one session. No removal or truncation;
/// the log lives until its owning session is dropped.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Full log in insertion order.
    pub fn snapshot(&self) -> &[Turn] {
        &self.turns
    }

    /// Last `n` turns (or all of them when fewer exist). Does not modify the log.
    pub fn recent(&self, n: usize) -> &[Turn] {
        tail(&self.turns, n)
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
