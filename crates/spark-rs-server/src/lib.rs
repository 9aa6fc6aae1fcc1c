//! Local HTTP proxy in front of an OpenAI-compatible upstream.
//!
//! Routes:
//! - `POST /api/chat` relays a chat completion with the caller's bearer key.
//! - `GET /health` reports liveness.

mod proxy;

pub use proxy::ProxyState;

use axum::routing::{get, post};
use axum::{Json, Router};
use log::info;
use serde_json::json;
use spark_rs_config::ProxyConfig;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Build the proxy router.
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/api/chat", post(proxy::chat))
        .route("/health", get(health))
        .with_state(Arc::new(state))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "service": "spark-proxy" }))
}

/// Bind `config.bind` and serve until Ctrl-C.
pub async fn serve(config: &ProxyConfig) -> Result<(), ServerError> {
    serve_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

/// Bind `config.bind` and serve until `shutdown` resolves.
pub async fn serve_with_shutdown(
    config: &ProxyConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    let listener = TcpListener::bind(&config.bind)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.bind.clone(),
            source,
        })?;
    let addr = listener.local_addr()?;
    info!(
        "proxy listening (addr={}, upstream={})",
        addr, config.upstream_url
    );
    axum::serve(listener, router(ProxyState::from_config(config)))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("proxy stopped (addr={})", addr);
    Ok(())
}
