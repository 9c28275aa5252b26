use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use validator_proxy::{Forwarder, PROXY_PATH, ProxyConfig, router};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; flags and real env vars still apply
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,validator_proxy=debug")),
        )
        .init();

    let config = ProxyConfig::parse();
    info!(listen = %config.listen, "starting proxy");

    let forwarder = Forwarder::new(&config.provider_url, &config.api_key);
    info!(provider = forwarder.provider_url(), "forwarding to provider");
    let app = router(forwarder);

    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    let local_addr = listener.local_addr()?;
    info!("listening on http://{local_addr}{PROXY_PATH}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
