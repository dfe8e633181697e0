use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::backend::BackendError;

/// Message returned when the backend failed without sending a payload of its own.
pub const GENERIC_BACKEND_FAILURE: &str = "LLM call failed";

// Based on https://github.com/tokio-rs/axum/blob/main/examples/anyhow-error-response/src/main.rs
#[derive(Debug)]
pub struct GatewayError {
    pub status: StatusCode,
    pub message: ErrorResponse,
}

/// The `{ "error": ... }` envelope every failure is reported in.
#[derive(Debug, Serialize, PartialEq)]
pub struct ErrorResponse {
    pub error: Value,
}

impl From<String> for ErrorResponse {
    fn from(message: String) -> Self {
        ErrorResponse {
            error: Value::String(message),
        }
    }
}

impl From<&str> for ErrorResponse {
    fn from(message: &str) -> Self {
        ErrorResponse {
            error: Value::String(message.to_string()),
        }
    }
}

impl From<Value> for ErrorResponse {
    fn from(error: Value) -> Self {
        ErrorResponse { error }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let mut res = Json(self.message).into_response();
        *res.status_mut() = self.status;
        res
    }
}

impl From<BackendError> for GatewayError {
    fn from(err: BackendError) -> Self {
        tracing::error!(error = %err, "LLM call failed");
        let message = match err {
            BackendError::Rejected {
                body: Some(body), ..
            } => ErrorResponse::from(body),
            _ => ErrorResponse::from(GENERIC_BACKEND_FAILURE),
        };
        GatewayError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
        }
    }
}

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "Rejected request body");
        GatewayError {
            status: rejection.status(),
            message: ErrorResponse::from(rejection.body_text()),
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!(error = %err, "Failed to build response body");
        GatewayError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: ErrorResponse::from(err.to_string()),
        }
    }
}

pub type GatewayResult<T, E = GatewayError> = Result<T, E>;

#[macro_export]
macro_rules! bail_gateway {
    ($status_code:expr, $error_message:expr) => {
        return Err($crate::error::GatewayError {
            status: $status_code,
            message: $crate::error::ErrorResponse::from($error_message),
        })
    };
    ($status:expr, $fmt:expr $(, $arg:expr)+) => {
        return Err($crate::error::GatewayError {
            status: $status,
            message: $crate::error::ErrorResponse::from(format!($fmt $(, $arg)+)),
        })
    };
}
