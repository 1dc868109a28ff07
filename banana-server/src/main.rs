//! Banana Studio Server
//!
//! A pure Rust HTTP server that:
//! - Proxies image-generation requests to the AI router on /api/generate
//! - Creates payment checkouts and reports payment readiness on /api/checkout*
//! - Drives the OAuth sign-in flow on /auth/*
//! - Serves the static front-end for everything else

use anyhow::Result;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

mod api;
mod router;
mod state;

#[cfg(test)]
mod test_helpers;

use banana_core::AppConfig;
use state::AppState;

const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port: u16 = std::env::var("BANANA_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let host = std::env::var("BANANA_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

    let config = AppConfig::from_env();
    if config.openrouter.api_key.is_none() {
        tracing::warn!("OPENROUTER_API_KEY is not set; /api/generate will answer 500");
    }

    let fallback_origin = Url::parse(&format!("http://{}:{}", host, port))?;
    let state = AppState::new(config, fallback_origin)?;

    info!("✅ Application state initialized");

    let app = router::build_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("🌐 Server listening on http://{}", addr);
    info!("🔌 API available at http://{}/api/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
