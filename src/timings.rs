use serde::Serialize;

/// Share of the measured wall-clock time attributed to prompt processing.
/// The backend reports no phase timings, so this split is an approximation.
const PROMPT_SHARE: f64 = 0.1;
/// Share of the measured wall-clock time attributed to generation.
const COMPLETION_SHARE: f64 = 0.9;

const MS_DECIMALS: i32 = 3;
const RATE_DECIMALS: i32 = 9;

/// Per-phase statistics derived from a single round-trip duration and the backend's token usage.
///
/// Field names on the wire match what existing consumers read (`predicted_*` for the generation phase).
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Timings {
    #[serde(rename = "prompt_n")]
    pub prompt_tokens: u64,
    pub prompt_ms: f64,
    pub prompt_per_token_ms: Option<f64>,
    pub prompt_per_second: Option<f64>,
    #[serde(rename = "predicted_n")]
    pub completion_tokens: u64,
    #[serde(rename = "predicted_ms")]
    pub completion_ms: f64,
    #[serde(rename = "predicted_per_token_ms")]
    pub completion_per_token_ms: Option<f64>,
    #[serde(rename = "predicted_per_second")]
    pub completion_per_second: Option<f64>,
}

/// Splits `elapsed_seconds` 10/90 between prompt processing and generation and derives rates from it.
///
/// Rates whose divisor is zero come out as `None` rather than infinity or NaN.
pub fn derive_timings(elapsed_seconds: f64, prompt_tokens: u64, completion_tokens: u64) -> Timings {
    let prompt_seconds = elapsed_seconds * PROMPT_SHARE;
    let completion_seconds = elapsed_seconds * COMPLETION_SHARE;

    Timings {
        prompt_tokens,
        prompt_ms: round_to(prompt_seconds * 1000.0, MS_DECIMALS),
        prompt_per_token_ms: per_token_ms(prompt_seconds, prompt_tokens),
        prompt_per_second: per_second(prompt_tokens, prompt_seconds),
        completion_tokens,
        completion_ms: round_to(completion_seconds * 1000.0, MS_DECIMALS),
        completion_per_token_ms: per_token_ms(completion_seconds, completion_tokens),
        completion_per_second: per_second(completion_tokens, completion_seconds),
    }
}

fn per_token_ms(seconds: f64, tokens: u64) -> Option<f64> {
    (tokens > 0).then(|| round_to(seconds * 1000.0 / tokens as f64, RATE_DECIMALS))
}

fn per_second(tokens: u64, seconds: f64) -> Option<f64> {
    (seconds > 0.0).then(|| round_to(tokens as f64 / seconds, RATE_DECIMALS))
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
