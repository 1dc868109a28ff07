//! OpenRouter chat-completion client (image generation).

use std::time::Duration;

use serde_json::Value;

use crate::config::OpenRouterConfig;
use crate::error::{AppError, AppResult};

/// Image generation is slow; give the model a full minute.
const GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct OpenRouterClient {
    client: reqwest::Client,
    config: OpenRouterConfig,
}

impl OpenRouterClient {
    pub fn new(client: reqwest::Client, config: OpenRouterConfig) -> Self {
        Self { client, config }
    }

    pub fn has_api_key(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Send a chat-completion payload and return the raw response JSON.
    ///
    /// Non-2xx answers become [`AppError::UpstreamStatus`] with the body
    /// echoed for diagnosis; connect/timeout failures become
    /// [`AppError::UpstreamUnreachable`].
    pub async fn chat_completion(&self, payload: &Value) -> AppResult<Value> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Config("Missing OPENROUTER_API_KEY".to_string()))?;

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        let mut request = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(payload)
            .timeout(GENERATION_TIMEOUT);
        if let Some(site_url) = &self.config.site_url {
            request = request.header("HTTP-Referer", site_url);
        }
        if let Some(app_name) = &self.config.app_name {
            request = request.header("X-Title", app_name);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::unreachable("OpenRouter", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("[generate] OpenRouter returned {}: {:.200}", status, body);
            return Err(AppError::UpstreamStatus {
                service: "OpenRouter",
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<Value>().await?)
    }
}
