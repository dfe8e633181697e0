#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use llm_gateway::backend::{BackendError, Completion, CompletionBackend};
use llm_gateway::config::Config;
use llm_gateway::generation::GenerationPayload;
use llm_gateway::{build_router, AppState};

pub const API_KEY: &str = "test-key";

/// What the fake backend answers with.
pub enum Script {
    Reply { body: Value, elapsed: Duration },
    Reject { status: u16, body: Option<Value> },
    Unreachable,
}

/// Scripted backend that records every generation call it receives.
pub struct FakeBackend {
    script: Script,
    online: bool,
    calls: AtomicUsize,
    payloads: Mutex<Vec<GenerationPayload>>,
}

impl FakeBackend {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            online: true,
            calls: AtomicUsize::new(0),
            payloads: Mutex::new(Vec::new()),
        })
    }

    pub fn offline() -> Arc<Self> {
        Arc::new(Self {
            script: Script::Unreachable,
            online: false,
            calls: AtomicUsize::new(0),
            payloads: Mutex::new(Vec::new()),
        })
    }

    /// Replies with `content` and the given token usage after one second.
    pub fn replying(content: &str, prompt_tokens: u64, completion_tokens: u64) -> Arc<Self> {
        Self::new(Script::Reply {
            body: json!({
                "content": content,
                "usage": {
                    "prompt_tokens": prompt_tokens,
                    "completion_tokens": completion_tokens,
                    "total_tokens": prompt_tokens + completion_tokens
                }
            }),
            elapsed: Duration::from_secs(1),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_payload(&self) -> GenerationPayload {
        self.payloads
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("backend was never called")
    }
}

#[async_trait]
impl CompletionBackend for FakeBackend {
    async fn complete(&self, payload: &GenerationPayload) -> Result<Completion, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().unwrap().push(payload.clone());
        match &self.script {
            Script::Reply { body, elapsed } => Completion::from_body(body.clone(), *elapsed),
            Script::Reject { status, body } => Err(BackendError::Rejected {
                status: *status,
                body: body.clone(),
            }),
            Script::Unreachable => Err(BackendError::Unavailable("connection refused".into())),
        }
    }

    async fn probe(&self) -> Result<(), BackendError> {
        if self.online {
            Ok(())
        } else {
            Err(BackendError::Unavailable("connection refused".into()))
        }
    }
}

pub fn test_config() -> Config {
    Config {
        api_key: API_KEY.to_string(),
        ..Config::default()
    }
}

pub fn router_with(backend: Arc<FakeBackend>) -> Router {
    build_router(AppState::new(test_config(), backend))
}

pub async fn post_json(router: Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .header("authorization", format!("ApiKey {API_KEY}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}
