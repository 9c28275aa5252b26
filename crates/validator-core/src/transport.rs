//! Transport abstraction for sending a chat request and getting JSON back.
//!
//! Client code only ever talks to the credential proxy; the provider key
//! never leaves the server.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, SubmitError};
use crate::prompt::ChatRequest;
use crate::reply::{error_message, extract_reply, Reply, ReplySource};

pub const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:3000/api/openai";

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Sends `request` and returns the parsed JSON body of a 2xx response.
    async fn send(&self, request: &ChatRequest) -> Result<Value>;
}

/// Sends requests to the credential proxy over HTTP.
#[derive(Clone)]
pub struct ProxyTransport {
    client: Client,
    endpoint: String,
}

impl ProxyTransport {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }
}

/// `HTTP 502 Bad Gateway` style message for error bodies without one.
pub fn status_message(status: u16) -> String {
    let reason = reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("");
    format!("HTTP {status} {reason}").trim_end().to_string()
}

#[async_trait]
impl ChatTransport for ProxyTransport {
    fn name(&self) -> &'static str {
        "proxy"
    }

    async fn send(&self, request: &ChatRequest) -> Result<Value> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|body| error_message(&body))
                .unwrap_or_else(|| status_message(status.as_u16()));
            return Err(SubmitError::Request {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| SubmitError::Decode(e.to_string()))
    }
}

/// Sends `request` and normalizes whatever came back into a [`Reply`].
pub async fn request_reply(transport: &dyn ChatTransport, request: &ChatRequest) -> Result<Reply> {
    debug!(transport = transport.name(), model = %request.model, "sending idea");

    let body = transport.send(request).await?;
    let reply = extract_reply(&body);
    if reply.source == ReplySource::Raw {
        warn!(transport = transport.name(), "no known reply shape, showing raw body");
    }
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use axum::http::{header, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use tokio::net::TcpListener;

    /// Starts a server answering every POST on `/api/openai` with a canned
    /// JSON-typed response and returns its URL.
    async fn serve_canned(status: StatusCode, body: &'static str) -> String {
        let app = Router::new().route(
            "/api/openai",
            post(move || async move { (status, [(header::CONTENT_TYPE, "application/json")], body) }),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{addr}/api/openai")
    }

    fn sample_request() -> ChatRequest {
        ChatRequest {
            model: "gpt-4".to_string(),
            messages: Vec::new(),
            max_tokens: 10,
            temperature: 0.5,
        }
    }

    #[tokio::test]
    async fn test_success_body_is_parsed() {
        let url = serve_canned(StatusCode::OK, r#"{"choices":[{"message":{"content":"kkk"}}]}"#).await;
        let transport = ProxyTransport::new(&url);

        let reply = request_reply(&transport, &sample_request()).await.unwrap();
        assert_eq!(reply.text, "kkk");
        assert_eq!(reply.source, ReplySource::Choices);
    }

    #[tokio::test]
    async fn test_error_body_message_is_used() {
        let url = serve_canned(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"message":"Incorrect API key provided"}}"#,
        )
        .await;
        let err = ProxyTransport::new(&url)
            .send(&sample_request())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            SubmitError::Request {
                status: 401,
                message: "Incorrect API key provided".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_error_without_json_body_uses_status_line() {
        let url = serve_canned(StatusCode::BAD_GATEWAY, "upstream exploded").await;
        let err = ProxyTransport::new(&url)
            .send(&sample_request())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "HTTP 502 Bad Gateway");
    }

    #[tokio::test]
    async fn test_success_with_garbage_body_is_decode_error() {
        let url = serve_canned(StatusCode::OK, "<html>").await;
        let err = ProxyTransport::new(&url)
            .send(&sample_request())
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::Decode(_)));
    }

    #[test]
    fn test_request_body_matches_wire_shape() {
        let body = serde_json::to_value(sample_request()).unwrap();
        assert_eq!(body, json!({ "model": "gpt-4", "messages": [], "max_tokens": 10, "temperature": 0.5 }));
    }

    #[test]
    fn test_status_message() {
        assert_eq!(status_message(502), "HTTP 502 Bad Gateway");
        assert_eq!(status_message(429), "HTTP 429 Too Many Requests");
        assert_eq!(status_message(599), "HTTP 599");
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = ProxyTransport::new(&format!("http://{addr}/api/openai"));
        let err = transport.send(&sample_request()).await.unwrap_err();
        assert!(matches!(err, SubmitError::Transport(_)));
    }
}
