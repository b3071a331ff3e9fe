use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use wxdash_proxy::UpstreamClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Observability
    wxdash_obs::init("wxdash-proxy");

    // Config
    let cfg = wxdash_config::AppConfig::load().context("failed to load configuration")?;
    let api_key = cfg.api_key()?;
    let upstream_url = cfg.upstream_url()?;

    // Build app and state
    let upstream = UpstreamClient::new(upstream_url.as_str(), api_key);
    let (app, state) = wxdash_proxy::build_app(upstream)?;

    // Start HTTP server
    let addr: SocketAddr = cfg
        .http_bind()
        .parse()
        .context("Invalid HTTP bind address")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind TCP listener on {addr}"))?;

    // Mark ready just before serving
    wxdash_proxy::set_ready(&state, true);

    tracing::info!(%addr, upstream = %upstream_url, "HTTP server listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
