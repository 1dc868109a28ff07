//! Creem payments client (checkout session creation).

use std::time::Duration;

use serde_json::Value;

use crate::config::CreemConfig;
use crate::error::{AppError, AppResult};

const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct CreemClient {
    client: reqwest::Client,
    config: CreemConfig,
}

impl CreemClient {
    pub fn new(client: reqwest::Client, config: CreemConfig) -> Self {
        Self { client, config }
    }

    /// Create a checkout session and return the parsed response body.
    ///
    /// A 2xx answer that fails JSON decoding is treated as an empty object;
    /// the caller decides what a missing `checkout_url` means.
    pub async fn create_checkout(&self, payload: &Value) -> AppResult<Value> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Config("Missing CREEM_API_KEY".to_string()))?;

        let url = format!("{}/v1/checkouts", self.config.api_base_url());

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .json(payload)
            .timeout(CHECKOUT_TIMEOUT)
            .send()
            .await
            .map_err(|e| AppError::unreachable("Creem API", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("[checkout] Creem returned {}: {:.200}", status, body);
            return Err(AppError::UpstreamStatus {
                service: "Creem API",
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<Value>().await.unwrap_or_else(|_| Value::Object(Default::default())))
    }
}
