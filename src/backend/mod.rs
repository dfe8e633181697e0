use std::time::Duration;

use axum::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::generation::GenerationPayload;

pub mod http;

pub use http::HttpBackend;

#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend could not be reached or did not answer in time.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with a non-2xx status. `body` holds its payload when it sent one.
    #[error("Backend rejected the request with status {status}")]
    Rejected { status: u16, body: Option<Value> },

    #[error("Malformed backend response: {0}")]
    Malformed(String),
}

/// Token counts as reported by the backend. Missing or null counts read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

#[derive(Deserialize, Debug, Default)]
struct UsageFields {
    #[serde(default)]
    prompt_tokens: Option<u64>,
    #[serde(default)]
    completion_tokens: Option<u64>,
    #[serde(default)]
    total_tokens: Option<u64>,
}

impl From<UsageFields> for Usage {
    fn from(fields: UsageFields) -> Self {
        Self {
            prompt_tokens: fields.prompt_tokens.unwrap_or_default(),
            completion_tokens: fields.completion_tokens.unwrap_or_default(),
            total_tokens: fields.total_tokens.unwrap_or_default(),
        }
    }
}

// `null` reads the same as an absent key.
#[derive(Deserialize, Debug, Default)]
struct CompletionFields {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    usage: Option<UsageFields>,
}

/// A successful generation call: the backend's reply plus the wall-clock time it took.
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub usage: Usage,
    /// The reply object exactly as the backend sent it.
    pub body: Map<String, Value>,
    pub elapsed: Duration,
}

impl Completion {
    /// Reads `content` and `usage` out of a backend reply. The reply must be a JSON object.
    pub fn from_body(body: Value, elapsed: Duration) -> Result<Self, BackendError> {
        let Value::Object(body) = body else {
            return Err(BackendError::Malformed(
                "expected a JSON object".to_string(),
            ));
        };
        let fields: CompletionFields = serde_json::from_value(Value::Object(body.clone()))
            .map_err(|e| BackendError::Malformed(e.to_string()))?;

        Ok(Self {
            content: fields.content.unwrap_or_default(),
            usage: fields.usage.map(Usage::from).unwrap_or_default(),
            body,
            elapsed,
        })
    }
}

/// The downstream text-generation service.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Sends one generation call. No retries.
    async fn complete(&self, payload: &GenerationPayload) -> Result<Completion, BackendError>;

    /// Zero-token request used only to test reachability.
    async fn probe(&self) -> Result<(), BackendError>;
}
