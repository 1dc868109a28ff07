//! Application State
//!
//! Holds shared state for the server: the startup configuration snapshot and
//! the upstream clients. Everything is request-independent and immutable.

use std::sync::Arc;

use anyhow::Result;
use axum::http::HeaderMap;
use url::Url;

use banana_core::config::AppConfig;
use banana_core::origin::{resolve_origin, OriginHints};
use banana_core::upstream::{CreemClient, OpenRouterClient, SupabaseAuthClient};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<AppStateInner>,
}

pub struct AppStateInner {
    pub config: AppConfig,
    pub openrouter: OpenRouterClient,
    pub creem: CreemClient,
    pub auth: SupabaseAuthClient,
    /// Stand-in for "the request URL's own origin", derived from the bound
    /// address. Used when no usable host information arrives in headers.
    pub fallback_origin: Url,
}

impl AppState {
    pub fn new(config: AppConfig, fallback_origin: Url) -> Result<Self> {
        // Backstop timeout above every per-request timeout in the clients.
        let http = banana_core::http::create_client(120).map_err(|e| anyhow::anyhow!(e))?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                openrouter: OpenRouterClient::new(http.clone(), config.openrouter.clone()),
                creem: CreemClient::new(http.clone(), config.creem.clone()),
                auth: SupabaseAuthClient::new(http, config.supabase.clone()),
                config,
                fallback_origin,
            }),
        })
    }

    /// Canonical external origin for the given request's headers.
    pub fn request_origin(&self, headers: &HeaderMap) -> String {
        let hints = origin_hints(headers);
        resolve_origin(&hints, &self.inner.fallback_origin, &self.inner.config.site)
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}

pub fn origin_hints(headers: &HeaderMap) -> OriginHints {
    OriginHints {
        host: header_string(headers, "host"),
        forwarded_host: header_string(headers, "x-forwarded-host"),
        forwarded_proto: header_string(headers, "x-forwarded-proto"),
        origin: header_string(headers, "origin"),
        referer: header_string(headers, "referer"),
    }
}
