use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::AppState;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmStatus {
    Online,
    Offline,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct HealthResponse {
    pub api: String,
    pub llm: LlmStatus,
    /// Seconds since the gateway started
    pub uptime: f64,
    /// Unix time in milliseconds
    pub timestamp: u64,
}

/// Reports liveness of the gateway and its backend. Always answers 200; a failed probe only
/// marks the backend offline.
#[axum_macros::debug_handler]
pub async fn handle_health_request(State(state): State<AppState>) -> Json<HealthResponse> {
    let llm = match state.backend.probe().await {
        Ok(()) => LlmStatus::Online,
        Err(err) => {
            tracing::warn!(error = %err, "LLM probe failed");
            LlmStatus::Offline
        }
    };
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;

    Json(HealthResponse {
        api: "ok".to_string(),
        llm,
        uptime: state.started_at.elapsed().as_secs_f64(),
        timestamp,
    })
}
