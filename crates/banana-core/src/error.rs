//! Unified error types for Banana Studio Core.

use serde::Serialize;
use thiserror::Error;

/// Main error type for all Banana Studio operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Client sent a request we cannot use (missing prompt/images, bad fields).
    #[error("{0}")]
    InvalidInput(String),

    /// Request body arrived with a content type we do not accept.
    #[error("Unsupported content-type. Use JSON or multipart/form-data.")]
    UnsupportedMediaType,

    /// Configuration loading or validation failed (missing credential, bad URL).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Payments master switch is off.
    #[error("Payments are disabled.")]
    PaymentsDisabled,

    /// Upstream API answered with a non-success status.
    #[error("{service} error: {status}")]
    UpstreamStatus {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// Upstream API could not be reached at all (DNS, connect, timeout).
    #[error("Failed to reach {service}.")]
    UpstreamUnreachable {
        service: &'static str,
        detail: String,
        timed_out: bool,
    },

    /// Upstream answered 2xx but no image could be extracted anywhere.
    #[error("No images returned from model.")]
    NoImages { debug: serde_json::Value },

    /// Auth provider flow failed (authorize URL, code exchange, logout).
    #[error("Auth error: {0}")]
    Auth(String),

    /// Network request failed (HTTP client).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unclassified error with message.
    #[error("Server error: {0}")]
    Unknown(String),
}

impl AppError {
    /// Classify a reqwest failure as an unreachable-upstream error,
    /// keeping the timeout distinction intact.
    pub fn unreachable(service: &'static str, err: reqwest::Error) -> Self {
        AppError::UpstreamUnreachable {
            service,
            detail: err.to_string(),
            timed_out: err.is_timeout(),
        }
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

/// Result type alias for Banana Studio operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<String> for AppError {
    fn from(s: String) -> Self {
        AppError::Unknown(s)
    }
}

impl From<&str> for AppError {
    fn from(s: &str) -> Self {
        AppError::Unknown(s.to_string())
    }
}
