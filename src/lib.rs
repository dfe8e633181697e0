use std::sync::Arc;
use std::time::Instant;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::backend::CompletionBackend;
use crate::config::Config;

pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod generation;
pub mod handlers;
pub mod prompt;
pub mod telemetry;
pub mod timings;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub backend: Arc<dyn CompletionBackend>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config, backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            config: Arc::new(config),
            backend,
            started_at: Instant::now(),
        }
    }
}

/// Builds the gateway routes. Everything except `/health` sits behind the API key check.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/summarize", post(handlers::summarize::handle_summarize_request))
        .route("/abstraction", post(handlers::abstraction::handle_abstraction_request))
        .route("/translate", post(handlers::translate::handle_translate_request))
        .route("/generate", post(handlers::generate::handle_generate_request))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        .merge(protected)
        .route("/health", get(handlers::health::handle_health_request))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
