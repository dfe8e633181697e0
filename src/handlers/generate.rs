use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{GatewayError, GatewayResult};
use crate::generation::GenerationParams;
use crate::handlers::{require_text, required, run_generation, with_timings};
use crate::prompt::{PromptMetadata, TaskType};
use crate::{bail_gateway, AppState};

/// Generation request naming its task type. Unknown or absent task names use the default template.
#[derive(Deserialize, Debug)]
pub struct GenerateRequest {
    pub text: Option<String>,
    pub task: Option<String>,
    pub language: Option<String>,
    pub context: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(flatten)]
    pub params: GenerationParams,
}

#[axum_macros::debug_handler]
pub async fn handle_generate_request(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<GenerateRequest>, GatewayError>,
) -> GatewayResult<Json<Value>> {
    let text = require_text(req.text)?;
    let task = req
        .task
        .as_deref()
        .map_or(TaskType::Default, TaskType::from_name);

    let target_language = required(req.language);
    if task == TaskType::Translate && target_language.is_none() {
        tracing::debug!("Translation task without language");
        bail_gateway!(
            StatusCode::BAD_REQUEST,
            "Missing required fields: text and language"
        );
    }

    let metadata = PromptMetadata {
        target_language,
        context: req.context,
        keywords: req.keywords,
    };
    let completion = run_generation(&state, task, &text, &metadata, req.params).await?;

    Ok(Json(with_timings(completion)?))
}
