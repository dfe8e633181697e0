use axum::extract::State;
use axum::Json;
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GatewayError, GatewayResult};
use crate::generation::GenerationParams;
use crate::handlers::{require_text, run_generation};
use crate::prompt::{PromptMetadata, TaskType};
use crate::AppState;

#[derive(Deserialize, Debug)]
pub struct SummarizeRequest {
    pub text: Option<String>,
    #[serde(flatten)]
    pub params: GenerationParams,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct SummarizeResponse {
    /// The generated text, or the backend's whole reply when it carried no text.
    pub summary: Value,
}

#[axum_macros::debug_handler]
pub async fn handle_summarize_request(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<SummarizeRequest>, GatewayError>,
) -> GatewayResult<Json<SummarizeResponse>> {
    let text = require_text(req.text)?;
    let completion = run_generation(
        &state,
        TaskType::Summarize,
        &text,
        &PromptMetadata::default(),
        req.params,
    )
    .await?;

    let summary = if completion.content.is_empty() {
        Value::Object(completion.body)
    } else {
        Value::String(completion.content)
    };
    Ok(Json(SummarizeResponse { summary }))
}
