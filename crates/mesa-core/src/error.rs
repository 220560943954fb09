//! Error types for the Mesa chat pipeline

use thiserror::Error;

/// Result type alias for chat operations
pub type ChatResult<T> = Result<T, ChatError>;

/// Generic reply shown to the guest when a backend call fails. The failed
/// exchange is never written to the conversation log.
pub const USER_FACING_FAILURE: &str =
    "Lo siento, ha ocurrido un error. Por favor, intenta de nuevo.";

/// Errors that can occur while producing a reply
#[derive(Error, Debug)]
pub enum ChatError {
    /// Intent service unreachable, non-2xx, or undecodable body.
    /// `status` is `None` when no HTTP response was received.
    #[error("Classification error (status {status:?}): {body}")]
    Classification { status: Option<u16>, body: String },

    /// Completion service unreachable, non-2xx, or undecodable body.
    #[error("Completion error (status {status:?}): {body}")]
    Completion { status: Option<u16>, body: String },

    /// Contract violation upstream of the resolver.
    #[error("Resolution error: {0}")]
    Resolution(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ChatError {
    /// HTTP status carried by a remote failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ChatError::Classification { status, .. } | ChatError::Completion { status, .. } => {
                *status
            }
            _ => None,
        }
    }

    /// Transient failures only: transport errors (no status), 429 and 5xx.
    /// Client-side faults are never retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            ChatError::Classification { status, .. } | ChatError::Completion { status, .. } => {
                match status {
                    None => true,
                    Some(429) => true,
                    Some(code) => (500..600).contains(code),
                }
            }
            ChatError::Resolution(_) | ChatError::Config(_) => false,
        }
    }
}

impl From<config::ConfigError> for ChatError {
    fn from(err: config::ConfigError) -> Self {
        ChatError::Config(err.to_string())
    }
}
