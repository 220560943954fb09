//! Shared outbound HTTP plumbing for the remote bridges: client construction
//! and bounded retry on transient failures.

use std::time::Duration;

use crate::config::ChatConfig;
use crate::error::{ChatError, ChatResult};

/// Builds a bridge-specific error from an optional status and a diagnostic body.
pub(crate) type ErrorKind = fn(Option<u16>, String) -> ChatError;

#[derive(Debug, Clone, Copy)]
pub(crate) struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &ChatConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff: config.retry_backoff(),
        }
    }
}

pub(crate) fn build_client(config: &ChatConfig, kind: ErrorKind) -> ChatResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()
        .map_err(|e| kind(None, format!("HTTP client build failed: {}", e)))
}

/// Send the request built by `request`, retrying transient failures. Returns
/// the success status and raw body; non-2xx and transport errors map through `kind`.
pub(crate) async fn send_with_retry<F>(
    label: &str,
    policy: RetryPolicy,
    kind: ErrorKind,
    request: F,
) -> ChatResult<(u16, String)>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempt: u32 = 0;
    loop {
        match send_once(request(), kind).await {
            Ok(reply) => return Ok(reply),
            Err(err) if err.is_retryable() && attempt < policy.max_retries => {
                attempt += 1;
                tracing::warn!(
                    "[MESA] {} attempt {} failed ({}); retrying",
                    label,
                    attempt,
                    err
                );
                tokio::time::sleep(policy.backoff * attempt).await;
            }
            Err(err) => {
                tracing::error!("[MESA] {} failed: {}", label, err);
                return Err(err);
            }
        }
    }
}

async fn send_once(
    request: reqwest::RequestBuilder,
    kind: ErrorKind,
) -> ChatResult<(u16, String)> {
    let res = request
        .send()
        .await
        .map_err(|e| kind(None, format!("request failed: {}", e)))?;

    let status = res.status();
    let text = res
        .text()
        .await
        .map_err(|e| kind(Some(status.as_u16()), format!("body read failed: {}", e)))?;

    if !status.is_success() {
        return Err(kind(Some(status.as_u16()), text));
    }
    Ok((status.as_u16(), text))
}
