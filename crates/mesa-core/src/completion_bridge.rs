//! Completion Bridge: generative chat completion with the restaurant persona.
//! Sends persona + conversation + new utterance; returns the first choice verbatim.

use serde::{Deserialize, Serialize};

use crate::config::ChatConfig;
use crate::conversation::{self, Turn};
use crate::error::{ChatError, ChatResult};
use crate::http::{build_client, send_with_retry, RetryPolicy};
use crate::router::{BackendMode, Responder};

const API_KEY_HEADER: &str = "api-key";

pub const PERSONA_PROMPT: &str = "Eres un asistente virtual amigable de un restaurante. Ayudas a los clientes con información sobre el menú, horarios, reservaciones y ubicación. Sé cortés, profesional y útil.";

const MAX_TOKENS: u32 = 800;
const TEMPERATURE: f64 = 0.7;
const TOP_P: f64 = 0.95;
const FREQUENCY_PENALTY: f64 = 0.0;
const PRESENCE_PENALTY: f64 = 0.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
}

impl CompletionRequest {
    /// Persona first, then history in order, then the new user utterance.
    pub fn new(history: &[Turn], utterance: &str) -> Self {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: PERSONA_PROMPT.to_string(),
        });
        messages.extend(history.iter().map(|t| ChatMessage {
            role: t.role().as_str().to_string(),
            content: t.text().to_string(),
        }));
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: utterance.to_string(),
        });
        Self {
            messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            top_p: TOP_P,
            frequency_penalty: FREQUENCY_PENALTY,
            presence_penalty: PRESENCE_PENALTY,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: String,
}

/// First choice's content. Undecodable bodies and empty `choices` are completion
/// errors carrying the response status.
pub fn decode_completion(status: u16, body: &str) -> ChatResult<String> {
    let parsed: CompletionResponse =
        serde_json::from_str(body).map_err(|e| ChatError::Completion {
            status: Some(status),
            body: format!("response parse: {}: {}", e, body),
        })?;
    parsed
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| ChatError::Completion {
            status: Some(status),
            body: "response contained no choices".to_string(),
        })
}

fn completion_error(status: Option<u16>, body: String) -> ChatError {
    ChatError::Completion { status, body }
}

/// Free-form responder backed by a chat-completions deployment.
pub struct CompletionBridge {
    url: String,
    api_key: String,
    context_turns: Option<usize>,
    retry: RetryPolicy,
    client: reqwest::Client,
}

impl CompletionBridge {
    pub fn new(config: &ChatConfig) -> ChatResult<Self> {
        let url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            config.base_url(),
            config.deployment_name.trim(),
            config.openai_api_version
        );
        Ok(Self {
            url,
            api_key: config.api_key.trim().to_string(),
            context_turns: config.context_turns,
            retry: RetryPolicy::from_config(config),
            client: build_client(config, completion_error)?,
        })
    }

    pub async fn resolve(&self, history: &[Turn], utterance: &str) -> ChatResult<String> {
        let context = match self.context_turns {
            Some(n) => conversation::tail(history, n),
            None => history,
        };
        let body = CompletionRequest::new(context, utterance);
        tracing::info!(
            "[MESA] Completion Bridge: sending {} messages",
            body.messages.len()
        );

        let (status, text) = send_with_retry("Chat completion", self.retry, completion_error, || {
            self.client
                .post(&self.url)
                .header(API_KEY_HEADER, &self.api_key)
                .json(&body)
        })
        .await?;

        decode_completion(status, &text)
    }
}

#[async_trait::async_trait]
impl Responder for CompletionBridge {
    fn mode(&self) -> BackendMode {
        BackendMode::FreeForm
    }

    async fn respond(&self, history: &[Turn], utterance: &str) -> ChatResult<String> {
        self.resolve(history, utterance).await
    }
}
