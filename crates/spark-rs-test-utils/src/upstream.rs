use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use parking_lot::Mutex;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;

/// One request received by a `StubUpstream`.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub headers: HeaderMap,
    pub body: Value,
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    body: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

/// In-process chat-completion endpoint answering every POST with a fixed reply.
pub struct StubUpstream {
    addr: SocketAddr,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl StubUpstream {
    /// Bind on `127.0.0.1:0` and serve in the background.
    pub async fn start(status: u16, body: impl Into<String>) -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            status: StatusCode::from_u16(status).expect("valid status"),
            body: body.into(),
            calls: calls.clone(),
        };
        let app = Router::new()
            .route("/v1/chat/completions", post(record))
            .with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub upstream");
        let addr = listener.local_addr().expect("stub addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub upstream");
        });
        Self { addr, calls }
    }

    /// OpenAI-style success reply carrying `content`.
    pub async fn completion(content: &str) -> Self {
        let body = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        });
        Self::start(200, body.to_string()).await
    }

    pub fn url(&self) -> String {
        format!("http://{}/v1/chat/completions", self.addr)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }
}

async fn record(
    State(state): State<StubState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state.calls.lock().push(RecordedCall { headers, body });
    (
        state.status,
        [("content-type", "application/json")],
        state.body.clone(),
    )
}
