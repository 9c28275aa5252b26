//! Proxy configuration from flags, environment and an optional `.env` file.

use std::net::SocketAddr;

use clap::Parser;

pub const DEFAULT_PROVIDER_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Parser, Clone)]
#[command(name = "validator-proxy")]
#[command(about = "Forwards chat-completion requests to the model provider with a server-held key")]
pub struct ProxyConfig {
    /// Provider API key, sent as a bearer token
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Address to listen on
    #[arg(long, env = "PROXY_LISTEN", default_value = "127.0.0.1:3000")]
    pub listen: SocketAddr,

    /// Chat-completion endpoint requests are forwarded to
    #[arg(long, env = "PROVIDER_URL", default_value = DEFAULT_PROVIDER_URL)]
    pub provider_url: String,
}

impl std::fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("api_key", &"<redacted>")
            .field("listen", &self.listen)
            .field("provider_url", &self.provider_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let config = ProxyConfig::try_parse_from([
            "validator-proxy",
            "--api-key",
            "sk-test",
            "--listen",
            "0.0.0.0:8080",
            "--provider-url",
            "http://localhost:9999/v1/chat/completions",
        ])
        .unwrap();

        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.listen.port(), 8080);
        assert_eq!(config.provider_url, "http://localhost:9999/v1/chat/completions");
    }

    #[test]
    fn test_debug_hides_key() {
        let config = ProxyConfig::try_parse_from(["validator-proxy", "--api-key", "sk-secret"]).unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("sk-secret"));
    }
}
