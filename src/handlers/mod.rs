use axum::http::StatusCode;
use serde_json::Value;

use crate::backend::Completion;
use crate::error::GatewayResult;
use crate::generation::{GenerationParams, GenerationPayload};
use crate::prompt::{build_prompt, PromptMetadata, TaskType};
use crate::timings::derive_timings;
use crate::{bail_gateway, AppState};

pub mod abstraction;
pub mod generate;
pub mod health;
pub mod summarize;
pub mod translate;

/// Returns the value when it is present and non-empty.
pub(crate) fn required(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

pub(crate) fn require_text(text: Option<String>) -> GatewayResult<String> {
    match required(text) {
        Some(text) => Ok(text),
        None => {
            tracing::debug!("Request without text input");
            bail_gateway!(StatusCode::BAD_REQUEST, "Missing text input")
        }
    }
}

/// Builds the prompt for `task`, calls the backend once and hands back its reply.
#[tracing::instrument(level = "info", skip(state, text, metadata, params))]
pub(crate) async fn run_generation(
    state: &AppState,
    task: TaskType,
    text: &str,
    metadata: &PromptMetadata,
    params: GenerationParams,
) -> GatewayResult<Completion> {
    let prompt = build_prompt(text, task, metadata);
    let payload = GenerationPayload::new(prompt, task, params);
    let completion = state.backend.complete(&payload).await?;

    tracing::info!(
        prompt_tokens = completion.usage.prompt_tokens,
        completion_tokens = completion.usage.completion_tokens,
        elapsed_ms = completion.elapsed.as_millis() as u64,
        "Generation finished"
    );
    Ok(completion)
}

/// The backend reply with derived `timings` attached.
pub(crate) fn with_timings(completion: Completion) -> GatewayResult<Value> {
    let timings = derive_timings(
        completion.elapsed.as_secs_f64(),
        completion.usage.prompt_tokens,
        completion.usage.completion_tokens,
    );
    let mut body = completion.body;
    body.insert("timings".to_string(), serde_json::to_value(timings)?);
    Ok(Value::Object(body))
}
