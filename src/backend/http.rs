use std::time::{Duration, Instant};

use anyhow::Result;
use axum::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use url::Url;

use crate::backend::{BackendError, Completion, CompletionBackend};
use crate::generation::{GenerationPayload, ProbePayload};

/// Completion backend reached over HTTP, e.g. a llama.cpp server's `/completion` endpoint.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    url: Url,
    generation_timeout: Duration,
    probe_timeout: Duration,
}

impl HttpBackend {
    pub fn new(url: &str, generation_timeout: Duration, probe_timeout: Duration) -> Result<Self> {
        let url = Url::parse(url)?;
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            url,
            generation_timeout,
            probe_timeout,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl CompletionBackend for HttpBackend {
    #[tracing::instrument(level = "info", skip_all, fields(url = %self.url, max_tokens = payload.max_tokens))]
    async fn complete(&self, payload: &GenerationPayload) -> Result<Completion, BackendError> {
        let start = Instant::now();
        let response = self
            .client
            .post(self.url.clone())
            .timeout(self.generation_timeout)
            .json(payload)
            .send()
            .await
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;
        let response = reject_unsuccessful(response).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| BackendError::Malformed(e.to_string()))?;
        let elapsed = start.elapsed();

        tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, "Backend answered");
        Completion::from_body(body, elapsed)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(url = %self.url))]
    async fn probe(&self) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.url.clone())
            .timeout(self.probe_timeout)
            .json(&ProbePayload::default())
            .send()
            .await
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;
        reject_unsuccessful(response).await?;
        Ok(())
    }
}

/// Turns a non-2xx response into [`BackendError::Rejected`], keeping the body when there is one.
async fn reject_unsuccessful(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let body = if text.trim().is_empty() {
        None
    } else {
        Some(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    };

    Err(BackendError::Rejected {
        status: status.as_u16(),
        body,
    })
}
