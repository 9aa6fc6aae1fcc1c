use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use spark_rs_config::ProxyConfig;
use spark_rs_server::{ProxyState, router};
use spark_rs_test_utils::StubUpstream;
use tower::ServiceExt;

fn state_for(upstream_url: String) -> ProxyState {
    ProxyState::from_config(&ProxyConfig {
        upstream_url,
        ..ProxyConfig::default()
    })
}

fn chat_request(key: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json");
    if let Some(key) = key {
        builder = builder.header("authorization", format!("Bearer {key}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn forwards_with_default_model_and_attribution() {
    let upstream = StubUpstream::completion("Hi from upstream").await;
    let app = router(state_for(upstream.url()));

    let response = app
        .oneshot(chat_request(
            Some("sk-or-123"),
            json!({
                "messages": [{ "role": "user", "content": "hello" }],
                "temperature": 0.5
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(
        body.pointer("/choices/0/message/content"),
        Some(&json!("Hi from upstream"))
    );

    let calls = upstream.calls();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(
        call.body,
        json!({
            "model": "gpt-3.5-turbo",
            "messages": [{ "role": "user", "content": "hello" }],
            "temperature": 0.5
        })
    );
    let header = |name: &str| {
        call.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    assert_eq!(header("authorization").as_deref(), Some("Bearer sk-or-123"));
    assert_eq!(header("http-referer").as_deref(), Some("http://localhost:3001"));
    assert_eq!(header("x-title").as_deref(), Some("English Speaking Platform"));
}

#[tokio::test]
async fn missing_key_is_unauthorized() {
    let upstream = StubUpstream::completion("unused").await;
    let response = router(state_for(upstream.url()))
        .oneshot(chat_request(None, json!({ "messages": [] })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await, json!({ "error": "API key is required" }));
    assert!(upstream.calls().is_empty());
}

#[tokio::test]
async fn upstream_failure_status_is_relayed() {
    let upstream = StubUpstream::start(429, r#"{"error":{"message":"rate limited"}}"#).await;
    let response = router(state_for(upstream.url()))
        .oneshot(chat_request(
            Some("sk-or-123"),
            json!({ "model": "openai/gpt-4o", "messages": [] }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Failed to communicate with AI service" })
    );
    assert_eq!(upstream.calls()[0].body["model"], json!("openai/gpt-4o"));
}

#[tokio::test]
async fn unreachable_upstream_is_internal_error() {
    let response = router(state_for("http://127.0.0.1:9/v1/chat/completions".to_string()))
        .oneshot(chat_request(Some("sk"), json!({ "messages": [] })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await, json!({ "error": "Internal server error" }));
}

#[tokio::test]
async fn malformed_body_is_internal_error() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("authorization", "Bearer sk")
        .body(Body::from("not json"))
        .expect("request");
    let response = router(state_for("http://127.0.0.1:9/".to_string()))
        .oneshot(request)
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn health_reports_ok() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("request");
    let response = router(state_for("http://127.0.0.1:9/".to_string()))
        .oneshot(request)
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], json!("ok"));
}
