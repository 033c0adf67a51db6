use std::thread;
use std::time::Duration;

use anyhow::Result;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::http_client::http_client;

const RETRY_BACKOFF: Duration = Duration::from_millis(300);
const ERROR_BODY_PREVIEW: usize = 200;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    #[error("provider returned http {status}: {message}")]
    Status { status: u16, message: String },
    #[error("provider request failed: {0}")]
    Transport(String),
    #[error("provider reported an error: {0}")]
    Upstream(String),
    #[error("invalid provider payload: {0}")]
    Payload(String),
}

impl ProviderError {
    /// Rate limits, server errors and network failures are worth another try.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Transport(_) => true,
            Self::Upstream(_) | Self::Payload(_) => false,
        }
    }
}

/// Source of provider payloads. Endpoints are paths relative to the provider
/// base URL, e.g. `fixtures/statistics`.
pub trait Provider: Send + Sync {
    fn fetch_raw(&self, endpoint: &str, params: &[(&str, String)]) -> Result<String, ProviderError>;

    /// Fetches and unwraps the `response` array of the provider envelope.
    fn fetch(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Vec<Value>, ProviderError> {
        let body = self.fetch_raw(endpoint, params)?;
        parse_envelope(&body)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    errors: Value,
    #[serde(default)]
    response: Value,
}

pub fn parse_envelope(raw: &str) -> Result<Vec<Value>, ProviderError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(ProviderError::Payload("empty response".to_string()));
    }
    let envelope: Envelope = serde_json::from_str(trimmed)
        .map_err(|err| ProviderError::Payload(format!("invalid json: {err}")))?;

    if let Some(message) = first_error_message(&envelope.errors) {
        return Err(ProviderError::Upstream(message));
    }

    match envelope.response {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        other => Err(ProviderError::Payload(format!(
            "expected response array, got {}",
            json_kind(&other)
        ))),
    }
}

fn first_error_message(errors: &Value) -> Option<String> {
    match errors {
        Value::Array(items) => items.first().map(render_error_value),
        Value::Object(map) => map
            .iter()
            .next()
            .map(|(key, value)| format!("{key}: {}", render_error_value(value))),
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn render_error_value(value: &Value) -> String {
    value
        .as_str()
        .map(|s| s.to_string())
        .unwrap_or_else(|| value.to_string())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Blocking client for API-Football v3.
pub struct ApiFootball {
    client: Client,
    base_url: String,
    retries: u32,
}

impl ApiFootball {
    pub fn new(cfg: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(cfg)?,
            base_url: cfg.base_url.clone(),
            retries: cfg.retries,
        })
    }

    fn send_once(&self, url: &str, params: &[(&str, String)]) -> Result<String, ProviderError> {
        let resp = self
            .client
            .get(url)
            .query(params)
            .send()
            .map_err(|err| ProviderError::Transport(err.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .map_err(|err| ProviderError::Transport(format!("failed reading body: {err}")))?;
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message: status_message(&body),
            });
        }
        Ok(body)
    }
}

impl Provider for ApiFootball {
    fn fetch_raw(&self, endpoint: &str, params: &[(&str, String)]) -> Result<String, ProviderError> {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        let mut attempt = 0u32;
        loop {
            debug!(%url, ?params, attempt, "provider request");
            match self.send_once(&url, params) {
                Ok(body) => return Ok(body),
                Err(err) if err.is_transient() && attempt < self.retries => {
                    let backoff = RETRY_BACKOFF * 2u32.pow(attempt);
                    warn!(%url, attempt, error = %err, ?backoff, "transient provider failure");
                    thread::sleep(backoff);
                    attempt += 1;
                }
                Err(err) => {
                    warn!(%url, error = %err, "provider request failed");
                    return Err(err);
                }
            }
        }
    }
}

fn status_message(body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        v.get("message")
            .and_then(|m| m.as_str())
            .map(|m| m.to_string())
    });
    from_json.unwrap_or_else(|| body.chars().take(ERROR_BODY_PREVIEW).collect())
}
