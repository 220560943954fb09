//! Chat settings loaded from TOML and environment.
//!
//! | Source | Example | Notes |
//! |--------|---------|-------|
//! | defaults | see `DEFAULT_*` | always present |
//! | file | `config/mesa.toml` (or `MESA_CONFIG`) | optional |
//! | env | `MESA_ENDPOINT`, `MESA_API_KEY`, `MESA_MODE`, ... | `MESA_` prefix |
//! | env (build-injected) | `CHATBOT_ENDPOINT`, `CHATBOT_KEY`, `CHATBOT_DEPLOYMENT` | highest priority |
//!
//! Missing or placeholder credentials force the demo backend (see [`ChatConfig::effective_mode`]).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ChatResult;
use crate::router::BackendMode;

const DEFAULT_CONFIG_PATH: &str = "config/mesa.toml";
const DEFAULT_CLU_DEPLOYMENT: &str = "production";
const DEFAULT_CLU_API_VERSION: &str = "2022-10-01-preview";
const DEFAULT_OPENAI_API_VERSION: &str = "2024-02-15-preview";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 1;
const DEFAULT_RETRY_BACKOFF_MS: u64 = 250;
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_SESSION_IDLE_SECS: u64 = 1800;
const DEFAULT_MAX_SESSIONS: usize = 1000;

/// Settings for backend selection and the two remote bridges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Service base URL, e.g. `https://<resource>.cognitiveservices.azure.com`.
    #[serde(default)]
    pub endpoint: String,
    /// Subscription key (intent service) or API key (completion service). Never logged.
    #[serde(default, skip_serializing)]
    pub api_key: String,
    /// Intent project name, or completion deployment name.
    #[serde(default)]
    pub deployment_name: String,
    pub mode: BackendMode,
    /// Deployment slot of the intent project.
    pub clu_deployment: String,
    pub clu_api_version: String,
    pub openai_api_version: String,
    pub request_timeout_secs: u64,
    /// Extra attempts on transient failures (transport, 429, 5xx).
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    /// When set, only the last N turns are sent as completion context.
    #[serde(default)]
    pub context_turns: Option<usize>,
    pub bind_addr: String,
    /// Gateway sessions idle longer than this are dropped.
    pub session_idle_secs: u64,
    /// Gateway session cap; the least recently used session is dropped first.
    pub max_sessions: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            deployment_name: String::new(),
            mode: BackendMode::StructuredIntent,
            clu_deployment: DEFAULT_CLU_DEPLOYMENT.to_string(),
            clu_api_version: DEFAULT_CLU_API_VERSION.to_string(),
            openai_api_version: DEFAULT_OPENAI_API_VERSION.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            context_turns: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            session_idle_secs: DEFAULT_SESSION_IDLE_SECS,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl ChatConfig {
    /// Demo-only settings; no network backend is ever selected.
    pub fn demo() -> Self {
        Self {
            mode: BackendMode::Demo,
            ..Self::default()
        }
    }

    /// Load from `MESA_CONFIG` (default `config/mesa.toml`) and environment.
    pub fn load() -> ChatResult<Self> {
        let path = std::env::var("MESA_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(&path)
    }

    /// Load with an explicit file path. A missing file is not an error.
    pub fn load_from(path: &Path) -> ChatResult<Self> {
        let builder = config::Config::builder()
            .set_default("endpoint", "")?
            .set_default("api_key", "")?
            .set_default("deployment_name", "")?
            .set_default("mode", "structured_intent")?
            .set_default("clu_deployment", DEFAULT_CLU_DEPLOYMENT)?
            .set_default("clu_api_version", DEFAULT_CLU_API_VERSION)?
            .set_default("openai_api_version", DEFAULT_OPENAI_API_VERSION)?
            .set_default("request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS as i64)?
            .set_default("max_retries", DEFAULT_MAX_RETRIES as i64)?
            .set_default("retry_backoff_ms", DEFAULT_RETRY_BACKOFF_MS as i64)?
            .set_default("bind_addr", DEFAULT_BIND_ADDR)?
            .set_default("session_idle_secs", DEFAULT_SESSION_IDLE_SECS as i64)?
            .set_default("max_sessions", DEFAULT_MAX_SESSIONS as i64)?;

        let builder = if path.exists() {
            tracing::info!("[MESA] Loading chat config from {}", path.display());
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix("MESA").try_parsing(true))
            .set_override_option("endpoint", env_opt_string("CHATBOT_ENDPOINT"))?
            .set_override_option("api_key", env_opt_string("CHATBOT_KEY"))?
            .set_override_option("deployment_name", env_opt_string("CHATBOT_DEPLOYMENT"))?
            .build()?;

        Ok(built.try_deserialize()?)
    }

    /// Backend actually used: the configured mode, unless credentials are
    /// missing or still placeholders, in which case demo.
    pub fn effective_mode(&self) -> BackendMode {
        if self.mode == BackendMode::Demo {
            return BackendMode::Demo;
        }
        let missing: Vec<&str> = [
            ("endpoint", &self.endpoint),
            ("api_key", &self.api_key),
            ("deployment_name", &self.deployment_name),
        ]
        .into_iter()
        .filter(|(_, v)| is_placeholder(v))
        .map(|(k, _)| k)
        .collect();

        if missing.is_empty() {
            self.mode
        } else {
            tracing::warn!(
                "[MESA] Credentials not configured ({}); falling back to demo mode",
                missing.join(", ")
            );
            BackendMode::Demo
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn session_idle_ttl(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    /// Endpoint without trailing slash, for URL joining.
    pub fn base_url(&self) -> &str {
        self.endpoint.trim().trim_end_matches('/')
    }
}

/// Empty, template-substitution marker (`{{ ... }}`), or a `YOUR_...` sample value.
pub fn is_placeholder(value: &str) -> bool {
    let v = value.trim();
    if v.is_empty() || v.starts_with("{{") {
        return true;
    }
    let upper = v.to_uppercase();
    upper.contains("YOUR_") || upper.contains("YOUR-")
}

fn env_opt_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
