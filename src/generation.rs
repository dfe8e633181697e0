use serde::{Deserialize, Serialize};

use crate::prompt::TaskType;

pub const DEFAULT_TEMPERATURE: f64 = 0.3;
pub const DEFAULT_TOP_P: f64 = 1.0;
pub const DEFAULT_TOP_K: u32 = 1;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Sampling overrides a caller may send. An absent field (or `null`) takes the default; any
/// present value, `0` included, is kept as is.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationParams {
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub top_k: Option<u32>,
    pub max_tokens: Option<u32>,
}

/// Body of a generation call to the completion backend. Built fresh for every request.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GenerationPayload {
    pub prompt: String,
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub max_tokens: u32,
    pub stop: Vec<String>,
}

impl GenerationPayload {
    pub fn new(prompt: String, task: TaskType, params: GenerationParams) -> Self {
        Self {
            prompt,
            temperature: params.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            top_p: params.top_p.unwrap_or(DEFAULT_TOP_P),
            top_k: params.top_k.unwrap_or(DEFAULT_TOP_K),
            max_tokens: params.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            stop: vec![task.stop_sequence().to_string()],
        }
    }
}

/// Body of the liveness probe: asks the backend to generate nothing.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ProbePayload {
    pub prompt: &'static str,
    pub n_predict: u32,
}

impl Default for ProbePayload {
    fn default() -> Self {
        Self {
            prompt: " ",
            n_predict: 0,
        }
    }
}
