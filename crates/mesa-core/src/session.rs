//! Chat session: one conversation log plus the selected backend.
//!
//! The caller owns the session; there is no process-wide state. `respond`
//! takes `&mut self`, so one session handles one turn at a time.

use std::sync::Arc;

use crate::conversation::{Conversation, Turn};
use crate::error::{ChatError, ChatResult};
use crate::router::{BackendMode, Responder};

pub struct ChatSession {
    responder: Arc<dyn Responder>,
    conversation: Conversation,
}

impl ChatSession {
    pub fn new(responder: Arc<dyn Responder>) -> Self {
        Self {
            responder,
            conversation: Conversation::new(),
        }
    }

    pub fn mode(&self) -> BackendMode {
        self.responder.mode()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Produce a reply for `utterance`. On success the user turn and the reply
    /// are appended; on failure the log is left untouched.
    pub async fn respond(&mut self, utterance: &str) -> ChatResult<String> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(ChatError::Resolution("empty utterance".to_string()));
        }

        let reply = self
            .responder
            .respond(self.conversation.snapshot(), utterance)
            .await?;

        self.conversation.append(Turn::user(utterance));
        self.conversation.append(Turn::assistant(reply.clone()));
        tracing::debug!(
            "[MESA] Turn committed ({} turns in log)",
            self.conversation.len()
        );
        Ok(reply)
    }
}
