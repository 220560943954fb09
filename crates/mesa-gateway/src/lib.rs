//! Mesa Gateway: HTTP surface for the restaurant chat.
//! One `ChatSession` per session id; a per-session mutex serializes turns.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{Path, State},
    http::{Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use dashmap::DashMap;
use mesa_core::{ChatConfig, ChatError, ChatSession, Responder, Turn, USER_FACING_FAILURE};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

/// A chat session plus the time of its last turn, for idle expiry.
pub struct SessionSlot {
    chat: ChatSession,
    last_used: Instant,
}

pub type SessionHandle = Arc<Mutex<SessionSlot>>;

/// Bounds on the in-memory session map.
#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    pub idle_ttl: Duration,
    pub max_sessions: usize,
}

impl SessionLimits {
    pub fn from_config(config: &ChatConfig) -> Self {
        Self {
            idle_ttl: config.session_idle_ttl(),
            max_sessions: config.max_sessions,
        }
    }
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self::from_config(&ChatConfig::default())
    }
}

#[derive(Clone)]
pub struct AppState {
    responder: Arc<dyn Responder>,
    sessions: Arc<DashMap<String, SessionHandle>>,
    limits: SessionLimits,
}

impl AppState {
    pub fn new(responder: Arc<dyn Responder>) -> Self {
        Self::with_limits(responder, SessionLimits::default())
    }

    pub fn with_limits(responder: Arc<dyn Responder>, limits: SessionLimits) -> Self {
        Self {
            responder,
            sessions: Arc::new(DashMap::new()),
            limits,
        }
    }

    /// Existing session, or a fresh one bound to the shared responder. Creating
    /// a session first sweeps idle ones and makes room under the cap.
    fn session(&self, id: &str) -> SessionHandle {
        if let Some(handle) = self.sessions.get(id).map(|entry| Arc::clone(entry.value())) {
            return handle;
        }

        self.evict_idle();
        self.make_room();

        self.sessions
            .entry(id.to_string())
            .or_insert_with(|| {
                tracing::info!("[MESA] New chat session: {}", id);
                Arc::new(Mutex::new(SessionSlot {
                    chat: ChatSession::new(Arc::clone(&self.responder)),
                    last_used: Instant::now(),
                }))
            })
            .clone()
    }

    /// Sessions mid-turn are locked and never count as idle.
    fn evict_idle(&self) {
        let ttl = self.limits.idle_ttl;
        let before = self.sessions.len();
        self.sessions.retain(|_, handle| match handle.try_lock() {
            Ok(slot) => slot.last_used.elapsed() < ttl,
            Err(_) => true,
        });
        let dropped = before.saturating_sub(self.sessions.len());
        if dropped > 0 {
            tracing::info!("[MESA] Dropped {} idle chat sessions", dropped);
        }
    }

    fn make_room(&self) {
        let cap = self.limits.max_sessions.max(1);
        while self.sessions.len() >= cap {
            let oldest = self
                .sessions
                .iter()
                .filter_map(|entry| {
                    let at = entry.value().try_lock().ok()?.last_used;
                    Some((entry.key().clone(), at))
                })
                .min_by_key(|(_, at)| *at)
                .map(|(id, _)| id);
            match oldest {
                Some(id) => {
                    self.sessions.remove(&id);
                    tracing::info!("[MESA] Session cap reached; dropped {}", id);
                }
                None => break,
            }
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub session_id: String,
    pub reply: String,
    pub mode: String,
}

#[derive(Debug, Serialize)]
pub struct ChatFailure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryReply {
    pub session_id: String,
    pub mode: String,
    pub turns: Vec<Turn>,
}

type ApiError = (StatusCode, Json<ChatFailure>);

fn failure(status: StatusCode, session_id: Option<String>, error: &str) -> ApiError {
    (
        status,
        Json(ChatFailure {
            session_id,
            error: error.to_string(),
        }),
    )
}

pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/v1/chat", post(chat_handler))
        .route("/api/v1/chat/:session_id", delete(end_session_handler))
        .route("/api/v1/chat/:session_id/history", get(history_handler))
        .with_state(state)
        .layer(axum::middleware::from_fn(log_request))
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> Response {
    tracing::info!("[MESA] {} {}", request.method(), request.uri().path());
    next.run(request).await
}

async fn health() -> &'static str {
    "OK"
}

/// POST /api/v1/chat: one turn. Backend failures return the generic guest
/// message; details go to the log only.
async fn chat_handler(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let message = body.message.trim();
    if message.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, body.session_id, "message is empty"));
    }

    let session_id = body
        .session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let handle = state.session(&session_id);
    let mut slot = handle.lock().await;
    let result = slot.chat.respond(message).await;
    slot.last_used = Instant::now();

    match result {
        Ok(reply) => Ok(Json(ChatReply {
            session_id,
            reply,
            mode: slot.chat.mode().to_string(),
        })),
        Err(err) => {
            tracing::error!("[MESA] Session {} turn failed: {}", session_id, err);
            // A session whose first turn failed holds nothing worth keeping.
            if slot.chat.conversation().is_empty() {
                state
                    .sessions
                    .remove_if(&session_id, |_, h| Arc::ptr_eq(h, &handle));
            }
            let status = match err {
                ChatError::Resolution(_) => StatusCode::BAD_REQUEST,
                ChatError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
                ChatError::Classification { .. } | ChatError::Completion { .. } => {
                    StatusCode::BAD_GATEWAY
                }
            };
            Err(failure(status, Some(session_id), USER_FACING_FAILURE))
        }
    }
}

/// GET /api/v1/chat/:session_id/history
async fn history_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<HistoryReply>, ApiError> {
    let handle = state
        .sessions
        .get(&session_id)
        .map(|entry| Arc::clone(entry.value()))
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, Some(session_id.clone()), "unknown session"))?;

    let slot = handle.lock().await;
    Ok(Json(HistoryReply {
        mode: slot.chat.mode().to_string(),
        turns: slot.chat.conversation().snapshot().to_vec(),
        session_id,
    }))
}

/// DELETE /api/v1/chat/:session_id: drop the session (restart), not a truncation.
async fn end_session_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match state.sessions.remove(&session_id) {
        Some(_) => {
            tracing::info!("[MESA] Chat session ended: {}", session_id);
            StatusCode::NO_CONTENT.into_response()
        }
        None => failure(StatusCode::NOT_FOUND, Some(session_id), "unknown session").into_response(),
    }
}
