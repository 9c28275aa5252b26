//! Relays a request body to the provider with the server-held credential.

use bytes::Bytes;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::ForwardError;

#[derive(Clone)]
pub struct Forwarder {
    client: Client,
    provider_url: String,
    api_key: String,
}

impl Forwarder {
    pub fn new(provider_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            provider_url: provider_url.to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn provider_url(&self) -> &str {
        &self.provider_url
    }

    /// Sends `body` as-is and returns the provider's status and JSON body.
    ///
    /// The body is not inspected; any status the provider answers with is
    /// passed back, only transport failures and non-JSON bodies are errors.
    pub async fn forward(&self, body: Bytes) -> Result<(u16, Value), ForwardError> {
        debug!(bytes = body.len(), url = %self.provider_url, "forwarding");

        let response = self
            .client
            .post(&self.provider_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let value = serde_json::from_slice(&bytes)?;

        debug!(status, "provider answered");
        Ok((status, value))
    }
}
