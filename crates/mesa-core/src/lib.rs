//! Mesa: restaurant chat core library.
//! Message routing (demo, intent classification, chat completion), response
//! resolution from intent/entity templates, and per-session conversation state.

pub mod completion_bridge;
pub mod config;
pub mod conversation;
pub mod demo;
pub mod error;
mod http;
pub mod intent_bridge;
pub mod resolver;
pub mod router;
pub mod session;
pub mod templates;

pub use completion_bridge::CompletionBridge;
pub use config::ChatConfig;
pub use conversation::{Conversation, Role, Turn};
pub use error::{ChatError, ChatResult, USER_FACING_FAILURE};
pub use intent_bridge::{Classification, IntentBridge};
pub use resolver::Entity;
pub use router::{select_responder, BackendMode, DemoResponder, Responder};
pub use session::ChatSession;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
