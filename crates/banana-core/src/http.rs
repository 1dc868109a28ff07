//! HTTP client construction.

use reqwest::Client;

/// Shared builder with keepalive settings. Individual calls still set
/// per-request timeouts; the builder timeout is a backstop.
fn base_builder(timeout_secs: u64) -> reqwest::ClientBuilder {
    Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .tcp_nodelay(true)
}

/// Create an HTTP client with the given backstop timeout.
pub fn create_client(timeout_secs: u64) -> Result<Client, String> {
    base_builder(timeout_secs)
        .build()
        .map_err(|e| format!("HTTP client builder failed: {e}"))
}
