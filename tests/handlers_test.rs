mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};

use common::{post_json, router_with, send, FakeBackend, Script, API_KEY};
use llm_gateway::prompt::{ABSTRACTION_STOP, SUMMARY_STOP, TRANSLATION_STOP};

#[tokio::test]
async fn summarize_returns_summary_only() {
    let backend = FakeBackend::replying("Korte samenvatting.", 40, 8);
    let (status, body) = post_json(
        router_with(backend.clone()),
        "/summarize",
        json!({"text": "Dit is een testverslag."}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"summary": "Korte samenvatting."}));
    let payload = backend.last_payload();
    assert!(payload.prompt.contains("Dit is een testverslag."));
    assert_eq!(payload.stop, vec![SUMMARY_STOP.to_string()]);
}

#[tokio::test]
async fn summarize_without_text_is_rejected() {
    let backend = FakeBackend::replying("unused", 0, 0);
    for body in [json!({}), json!({"text": ""}), json!({"text": null})] {
        let (status, response) = post_json(router_with(backend.clone()), "/summarize", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, json!({"error": "Missing text input"}));
    }
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn summarize_without_content_returns_whole_reply() {
    let reply = json!({"usage": {"prompt_tokens": 4, "completion_tokens": 0}, "stop": true});
    let backend = FakeBackend::new(Script::Reply {
        body: reply.clone(),
        elapsed: Duration::from_millis(50),
    });
    let (status, body) = post_json(
        router_with(backend),
        "/summarize",
        json!({"text": "Dit is een testverslag."}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"summary": reply}));
}

#[tokio::test]
async fn abstraction_attaches_timings() {
    let backend = FakeBackend::replying("Abstractie.", 10, 90);
    let (status, body) = post_json(
        router_with(backend.clone()),
        "/abstraction",
        json!({"text": "Cliënt sliep onrustig."}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "Abstractie.");
    assert_eq!(body["usage"]["total_tokens"], 100);
    let timings = &body["timings"];
    assert_eq!(timings["prompt_n"], 10);
    assert_eq!(timings["predicted_n"], 90);
    assert_eq!(timings["prompt_ms"].as_f64(), Some(100.0));
    assert_eq!(timings["predicted_ms"].as_f64(), Some(900.0));
    assert_eq!(timings["prompt_per_token_ms"].as_f64(), Some(10.0));
    assert_eq!(timings["predicted_per_token_ms"].as_f64(), Some(10.0));

    let payload = backend.last_payload();
    assert_eq!(payload.stop, vec![ABSTRACTION_STOP.to_string()]);
    assert!(payload.prompt.contains("Cliënt sliep onrustig."));
}

#[tokio::test]
async fn abstraction_with_null_usage_reports_zero_tokens() {
    let backend = FakeBackend::new(Script::Reply {
        body: json!({"content": "Abstractie.", "usage": null}),
        elapsed: Duration::from_secs(1),
    });
    let (status, body) = post_json(
        router_with(backend),
        "/abstraction",
        json!({"text": "Cliënt sliep onrustig."}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "Abstractie.");
    assert!(body["usage"].is_null());
    let timings = &body["timings"];
    assert_eq!(timings["prompt_n"], 0);
    assert_eq!(timings["predicted_n"], 0);
    assert!(timings["prompt_per_token_ms"].is_null());
    assert_eq!(timings["prompt_ms"].as_f64(), Some(100.0));
}

#[tokio::test]
async fn abstraction_applies_defaults_and_keeps_zero_overrides() {
    let backend = FakeBackend::replying("x", 1, 1);
    post_json(
        router_with(backend.clone()),
        "/abstraction",
        json!({"text": "t", "temperature": 0, "max_tokens": 256}),
    )
    .await;

    let payload = backend.last_payload();
    assert_eq!(payload.temperature, 0.0);
    assert_eq!(payload.max_tokens, 256);
    assert_eq!(payload.top_p, 1.0);
    assert_eq!(payload.top_k, 1);
}

#[tokio::test]
async fn abstraction_passes_unknown_backend_fields_through() {
    let backend = FakeBackend::new(Script::Reply {
        body: json!({"content": "x", "model": "qwen2.5-14b", "stop": true}),
        elapsed: Duration::from_millis(500),
    });
    let (status, body) =
        post_json(router_with(backend), "/abstraction", json!({"text": "t"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model"], "qwen2.5-14b");
    assert_eq!(body["stop"], true);
    assert_eq!(body["timings"]["prompt_n"], 0);
    assert!(body["timings"]["prompt_per_token_ms"].is_null());
}

#[tokio::test]
async fn translate_without_language_never_calls_backend() {
    let backend = FakeBackend::replying("unused", 0, 0);
    let (status, body) = post_json(
        router_with(backend.clone()),
        "/translate",
        json!({"text": "Goedemorgen"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Missing required fields: text and language"}));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn translate_uses_language_in_prompt() {
    let backend = FakeBackend::replying("Good morning", 5, 3);
    let (status, body) = post_json(
        router_with(backend.clone()),
        "/translate",
        json!({"text": "Goedemorgen", "language": "en", "top_k": 40}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "Good morning");
    assert!(body["timings"].is_object());
    let payload = backend.last_payload();
    assert!(payload.prompt.contains("en."));
    assert!(payload.prompt.contains("Goedemorgen"));
    assert_eq!(payload.top_k, 40);
    assert_eq!(payload.stop, vec![TRANSLATION_STOP.to_string()]);
}

#[tokio::test]
async fn backend_error_body_is_forwarded() {
    let backend = FakeBackend::new(Script::Reject {
        status: 503,
        body: Some(json!({"error": "overloaded"})),
    });
    let (status, body) =
        post_json(router_with(backend.clone()), "/abstraction", json!({"text": "t"})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": {"error": "overloaded"}}));
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn unreachable_backend_gives_generic_failure() {
    let backend = FakeBackend::new(Script::Unreachable);
    let (status, body) = post_json(
        router_with(backend),
        "/translate",
        json!({"text": "t", "language": "fr"}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "LLM call failed"}));
}

#[tokio::test]
async fn generate_dispatches_by_task_name() {
    let backend = FakeBackend::replying("ok", 2, 2);
    let (status, _) = post_json(
        router_with(backend.clone()),
        "/generate",
        json!({
            "text": "rapport",
            "task": "customWithMetadata",
            "context": "avonddienst",
            "keywords": ["pijn", "slaap"]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let prompt = backend.last_payload().prompt;
    assert!(prompt.contains("avonddienst"));
    assert!(prompt.contains("pijn, slaap"));
}

#[tokio::test]
async fn generate_falls_back_to_default_template() {
    let backend = FakeBackend::replying("ok", 1, 1);
    let (status, _) = post_json(
        router_with(backend.clone()),
        "/generate",
        json!({"text": "rapport", "task": "haiku"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let payload = backend.last_payload();
    assert!(payload.prompt.contains("standaardprocedure"));
    assert_eq!(payload.stop, vec!["<|END_REACTIE|>".to_string()]);
}

#[tokio::test]
async fn generate_translation_requires_language() {
    let backend = FakeBackend::replying("unused", 0, 0);
    let (status, _) = post_json(
        router_with(backend.clone()),
        "/generate",
        json!({"text": "rapport", "task": "translation"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn malformed_json_uses_error_envelope() {
    let backend = FakeBackend::replying("unused", 0, 0);
    let request = Request::builder()
        .method("POST")
        .uri("/abstraction")
        .header("content-type", "application/json")
        .header("authorization", format!("ApiKey {API_KEY}"))
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(router_with(backend.clone()), request).await;

    assert!(status.is_client_error());
    assert!(body["error"].is_string());
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn health_reports_online_backend() {
    let backend = FakeBackend::replying("unused", 0, 0);
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(router_with(backend), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["api"], "ok");
    assert_eq!(body["llm"], "online");
    assert!(body["uptime"].as_f64().unwrap() >= 0.0);
    assert!(body["timestamp"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn health_stays_ok_when_backend_is_down() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(router_with(FakeBackend::offline()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["llm"], "offline");
}

fn with_authorization(path: &str, value: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json");
    if let Some(value) = value {
        builder = builder.header("authorization", value);
    }
    builder
        .body(Body::from(json!({"text": "t"}).to_string()))
        .unwrap()
}

#[tokio::test]
async fn requests_without_key_are_unauthorized() {
    let backend = FakeBackend::replying("unused", 0, 0);
    let (status, body) = send(
        router_with(backend.clone()),
        with_authorization("/abstraction", None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Missing Authorization header"}));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn wrong_scheme_is_unauthorized() {
    let backend = FakeBackend::replying("unused", 0, 0);
    let (status, body) = send(
        router_with(backend),
        with_authorization("/summarize", Some(&format!("Basic {API_KEY}"))),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Invalid authorization scheme"}));
}

#[tokio::test]
async fn wrong_key_is_forbidden() {
    let backend = FakeBackend::replying("unused", 0, 0);
    let (status, body) = send(
        router_with(backend.clone()),
        with_authorization("/translate", Some("ApiKey nope")),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"error": "Invalid API key"}));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn bearer_scheme_is_accepted() {
    let backend = FakeBackend::replying("ok", 1, 1);
    let (status, body): (StatusCode, Value) = send(
        router_with(backend.clone()),
        with_authorization("/summarize", Some(&format!("Bearer {API_KEY}"))),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"], "ok");
    assert_eq!(backend.calls(), 1);
}
