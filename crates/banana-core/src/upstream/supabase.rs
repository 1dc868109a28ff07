//! Auth provider client (Supabase-style GoTrue HTTP API).
//!
//! The OAuth flow itself lives at the provider; this client only builds the
//! authorize redirect URL, exchanges callback codes for sessions, and does
//! best-effort user lookup / logout with a session token.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::config::SupabaseConfig;
use crate::error::{AppError, AppResult};

const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(10);
/// User lookup is a nice-to-have on the checkout path; fail fast.
const USER_LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

/// Tokens returned by a successful code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    email: Option<String>,
}

#[derive(Clone)]
pub struct SupabaseAuthClient {
    client: reqwest::Client,
    config: SupabaseConfig,
}

impl SupabaseAuthClient {
    pub fn new(client: reqwest::Client, config: SupabaseConfig) -> Self {
        Self { client, config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.url.is_some() && self.config.anon_key.is_some()
    }

    fn base_url(&self) -> AppResult<Url> {
        let base = self
            .config
            .url
            .as_deref()
            .ok_or_else(|| AppError::Config("Missing SUPABASE_URL".to_string()))?;
        Url::parse(base).map_err(|e| AppError::Auth(format!("invalid SUPABASE_URL: {e}")))
    }

    fn anon_key(&self) -> AppResult<&str> {
        self.config
            .anon_key
            .as_deref()
            .ok_or_else(|| AppError::Config("Missing SUPABASE_ANON_KEY".to_string()))
    }

    /// Provider authorize URL the browser is redirected to for sign-in.
    pub fn authorize_url(&self, redirect_to: &str) -> AppResult<String> {
        let mut url = self
            .base_url()?
            .join("/auth/v1/authorize")
            .map_err(|e| AppError::Auth(format!("authorize URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("provider", "google")
            .append_pair("redirect_to", redirect_to);
        Ok(url.to_string())
    }

    /// Exchange an OAuth callback code for a session.
    pub async fn exchange_code(&self, code: &str) -> AppResult<AuthSession> {
        let mut url = self
            .base_url()?
            .join("/auth/v1/token")
            .map_err(|e| AppError::Auth(format!("token URL: {e}")))?;
        url.query_pairs_mut().append_pair("grant_type", "authorization_code");

        let response = self
            .client
            .post(url)
            .header("apikey", self.anon_key()?)
            .json(&json!({ "code": code }))
            .timeout(EXCHANGE_TIMEOUT)
            .send()
            .await
            .map_err(|e| AppError::unreachable("auth provider", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Auth(format!("code exchange failed ({}): {}", status, body)));
        }

        response
            .json::<AuthSession>()
            .await
            .map_err(|e| AppError::Auth(format!("code exchange response: {e}")))
    }

    /// Best-effort email lookup for the session's user. Any failure is `None`.
    pub async fn user_email(&self, access_token: &str) -> Option<String> {
        let url = self.base_url().ok()?.join("/auth/v1/user").ok()?;
        let response = self
            .client
            .get(url)
            .header("apikey", self.anon_key().ok()?)
            .bearer_auth(access_token)
            .timeout(USER_LOOKUP_TIMEOUT)
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.json::<AuthUser>().await.ok()?.email
    }

    /// Revoke the session upstream. Failures are logged, not propagated:
    /// the local cookies are cleared either way.
    pub async fn sign_out(&self, access_token: &str) {
        let Ok(base) = self.base_url() else { return };
        let Ok(url) = base.join("/auth/v1/logout") else { return };
        let Ok(anon_key) = self.anon_key() else { return };

        let result = self
            .client
            .post(url)
            .header("apikey", anon_key)
            .bearer_auth(access_token)
            .timeout(EXCHANGE_TIMEOUT)
            .send()
            .await;
        if let Err(e) = result {
            tracing::warn!("[auth] sign-out call failed: {}", e);
        }
    }
}
