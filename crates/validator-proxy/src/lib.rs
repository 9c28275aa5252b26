//! Credential proxy for the SaaS Validator.
//!
//! Exposes a single endpoint that accepts a chat-completion body from the
//! client, attaches the provider key and relays the provider's answer
//! untouched. The key never reaches the client.

pub mod config;
pub mod error;
pub mod forward;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
};
use bytes::Bytes;
use serde_json::json;
use tracing::{error, warn};

pub use config::ProxyConfig;
pub use error::ForwardError;
pub use forward::Forwarder;

pub const PROXY_PATH: &str = "/api/openai";

pub fn router(forwarder: Forwarder) -> Router {
    Router::new()
        .route(PROXY_PATH, any(handle_proxy))
        .with_state(Arc::new(forwarder))
}

/// Handler for /api/openai
async fn handle_proxy(
    method: Method,
    State(forwarder): State<Arc<Forwarder>>,
    body: Bytes,
) -> Response {
    if method != Method::POST {
        warn!(%method, "rejected non-POST request");
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            Json(json!({ "error": "method not allowed" })),
        )
            .into_response();
    }

    match forwarder.forward(body).await {
        Ok((status, value)) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, Json(value)).into_response()
        }
        Err(e) => {
            error!(error = %e, "forwarding failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
