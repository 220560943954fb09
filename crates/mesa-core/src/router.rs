//! Backend strategy selection.
//!
//! Every backend implements [`Responder`]. The selector is pure dispatch on the
//! effective mode: no retries across strategies and no runtime fallback to demo
//! once a network backend has been chosen.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::completion_bridge::CompletionBridge;
use crate::config::ChatConfig;
use crate::conversation::Turn;
use crate::demo;
use crate::error::ChatResult;
use crate::intent_bridge::IntentBridge;

/// Which backend produces replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendMode {
    Demo,
    StructuredIntent,
    FreeForm,
}

impl BackendMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendMode::Demo => "demo",
            BackendMode::StructuredIntent => "structured_intent",
            BackendMode::FreeForm => "free_form",
        }
    }
}

impl std::fmt::Display for BackendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reply-producing backend. `history` is the conversation so far, excluding `utterance`.
#[async_trait::async_trait]
pub trait Responder: Send + Sync {
    fn mode(&self) -> BackendMode;

    async fn respond(&self, history: &[Turn], utterance: &str) -> ChatResult<String>;
}

/// Local keyword responder. Never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct DemoResponder;

#[async_trait::async_trait]
impl Responder for DemoResponder {
    fn mode(&self) -> BackendMode {
        BackendMode::Demo
    }

    async fn respond(&self, _history: &[Turn], utterance: &str) -> ChatResult<String> {
        Ok(demo::resolve(utterance).to_string())
    }
}

/// Build the responder for the effective mode of `config`.
pub fn select_responder(config: &ChatConfig) -> ChatResult<Arc<dyn Responder>> {
    let mode = config.effective_mode();
    tracing::info!("[MESA] Backend selected: {}", mode);
    let responder: Arc<dyn Responder> = match mode {
        BackendMode::Demo => Arc::new(DemoResponder),
        BackendMode::StructuredIntent => {
            tracing::info!(
                "[MESA] Intent project: {} ({}) at {}",
                config.deployment_name,
                config.clu_deployment,
                config.base_url()
            );
            Arc::new(IntentBridge::new(config)?)
        }
        BackendMode::FreeForm => {
            tracing::info!(
                "[MESA] Completion deployment: {} at {}",
                config.deployment_name,
                config.base_url()
            );
            Arc::new(CompletionBridge::new(config)?)
        }
    };
    Ok(responder)
}
