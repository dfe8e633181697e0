use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;

use crate::bail_gateway;
use crate::error::GatewayResult;
use crate::AppState;

/// Schemes accepted in front of the key, e.g. `Authorization: ApiKey <key>`.
const ACCEPTED_SCHEMES: [&str; 2] = ["ApiKey", "Bearer"];

/// Pulls the key out of the `Authorization` header.
pub(crate) fn extract_api_key(headers: &HeaderMap) -> GatewayResult<&str> {
    let Some(header) = headers.get(AUTHORIZATION) else {
        bail_gateway!(StatusCode::UNAUTHORIZED, "Missing Authorization header")
    };
    let Ok(value) = header.to_str() else {
        bail_gateway!(StatusCode::UNAUTHORIZED, "Invalid authorization scheme")
    };

    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        [scheme, key] if ACCEPTED_SCHEMES.contains(scheme) && !key.is_empty() => Ok(*key),
        _ => bail_gateway!(StatusCode::UNAUTHORIZED, "Invalid authorization scheme"),
    }
}

fn key_matches(provided: &str, expected: &str) -> bool {
    // An unset key refuses every caller.
    !expected.is_empty() && bool::from(provided.as_bytes().ct_eq(expected.as_bytes()))
}

pub(crate) async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> GatewayResult<Response> {
    let key = extract_api_key(request.headers())?;
    if key_matches(key, &state.config.api_key) {
        Ok(next.run(request).await)
    } else {
        tracing::debug!("Rejected request with invalid API key");
        bail_gateway!(StatusCode::FORBIDDEN, "Invalid API key")
    }
}
