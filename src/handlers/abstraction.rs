use axum::extract::State;
use axum::Json;
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{GatewayError, GatewayResult};
use crate::generation::GenerationParams;
use crate::handlers::{require_text, run_generation, with_timings};
use crate::prompt::{PromptMetadata, TaskType};
use crate::AppState;

/// A clinical report to abstract, with optional sampling overrides.
#[derive(Deserialize, Debug)]
pub struct AbstractionRequest {
    pub text: Option<String>,
    #[serde(flatten)]
    pub params: GenerationParams,
}

#[axum_macros::debug_handler]
pub async fn handle_abstraction_request(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<AbstractionRequest>, GatewayError>,
) -> GatewayResult<Json<Value>> {
    let text = require_text(req.text)?;
    let completion = run_generation(
        &state,
        TaskType::Abstract,
        &text,
        &PromptMetadata::default(),
        req.params,
    )
    .await?;

    Ok(Json(with_timings(completion)?))
}
