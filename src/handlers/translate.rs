use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{GatewayError, GatewayResult};
use crate::generation::GenerationParams;
use crate::handlers::{required, run_generation, with_timings};
use crate::prompt::{PromptMetadata, TaskType};
use crate::{bail_gateway, AppState};

#[derive(Deserialize, Debug)]
pub struct TranslateRequest {
    pub text: Option<String>,
    /// Target language, e.g. an ISO code such as `en` or `fr`
    pub language: Option<String>,
    #[serde(flatten)]
    pub params: GenerationParams,
}

#[axum_macros::debug_handler]
pub async fn handle_translate_request(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<TranslateRequest>, GatewayError>,
) -> GatewayResult<Json<Value>> {
    let (Some(text), Some(language)) = (required(req.text), required(req.language)) else {
        tracing::debug!("Translation request without text or language");
        bail_gateway!(
            StatusCode::BAD_REQUEST,
            "Missing required fields: text and language"
        )
    };

    let metadata = PromptMetadata {
        target_language: Some(language),
        ..Default::default()
    };
    let completion =
        run_generation(&state, TaskType::Translate, &text, &metadata, req.params).await?;

    Ok(Json(with_timings(completion)?))
}
