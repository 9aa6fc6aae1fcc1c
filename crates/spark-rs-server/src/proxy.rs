//! `POST /api/chat`: forward a chat completion to the upstream provider.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use log::{debug, error, warn};
use serde_json::{Map, Value, json};
use spark_rs_config::ProxyConfig;
use std::sync::Arc;

const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Upstream target and attribution shared by all requests.
#[derive(Debug, Clone)]
pub struct ProxyState {
    client: reqwest::Client,
    upstream_url: String,
    site_url: String,
    title: String,
}

impl ProxyState {
    pub fn from_config(config: &ProxyConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            upstream_url: config.upstream_url.clone(),
            site_url: config.site_url.clone(),
            title: config.title.clone(),
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

pub(crate) async fn chat(
    State(state): State<Arc<ProxyState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match forward(&state, &headers, &body).await {
        Ok(response) => response,
        Err(err) => {
            error!("proxy request failed (err={})", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum ForwardError {
    #[error("request body is not a JSON object")]
    InvalidBody,
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Upstream(#[from] reqwest::Error),
}

async fn forward(
    state: &ProxyState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Response, ForwardError> {
    let Value::Object(mut fields) = serde_json::from_slice::<Value>(body)? else {
        return Err(ForwardError::InvalidBody);
    };

    let api_key = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.replacen("Bearer ", "", 1))
        .unwrap_or_default();
    if api_key.is_empty() {
        return Ok(error_response(StatusCode::UNAUTHORIZED, "API key is required"));
    }

    let mut payload = Map::new();
    payload.insert(
        "model".to_string(),
        fields
            .remove("model")
            .unwrap_or_else(|| Value::String(DEFAULT_MODEL.to_string())),
    );
    if let Some(messages) = fields.remove("messages") {
        payload.insert("messages".to_string(), messages);
    }
    payload.extend(fields);
    debug!(
        "forwarding chat request (upstream={}, model={})",
        state.upstream_url, payload["model"]
    );

    let upstream = state
        .client
        .post(&state.upstream_url)
        .bearer_auth(&api_key)
        .header("HTTP-Referer", &state.site_url)
        .header("X-Title", &state.title)
        .json(&payload)
        .send()
        .await?;

    let status = upstream.status();
    if !status.is_success() {
        let detail = upstream.text().await.unwrap_or_default();
        warn!(
            "upstream rejected chat request (status={}, body={})",
            status.as_u16(),
            detail
        );
        let status = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        return Ok(error_response(status, "Failed to communicate with AI service"));
    }

    let data: Value = upstream.json().await?;
    Ok(Json(data).into_response())
}
