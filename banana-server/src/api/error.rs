//! Route-boundary error rendering.
//!
//! Every failure leaving this layer is a JSON body of the shape
//! `{error, detail?, hint?, debug?}` with the status from the error
//! taxonomy: 4xx client input, 500/501 configuration, 502 upstream.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::{json, Value};

use banana_core::AppError;

pub struct ApiError {
    status: StatusCode,
    body: Value,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": error.into() }),
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    fn with(mut self, key: &str, value: Value) -> Self {
        if let Some(obj) = self.body.as_object_mut() {
            obj.insert(key.to_string(), value);
        }
        self
    }

    pub fn detail(self, detail: impl Into<String>) -> Self {
        self.with("detail", Value::String(detail.into()))
    }

    pub fn hint(self, hint: impl Into<String>) -> Self {
        self.with("hint", Value::String(hint.into()))
    }

    pub fn debug(self, debug: Value) -> Self {
        self.with("debug", debug)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::InvalidInput(message) => ApiError::bad_request(message),
            AppError::UnsupportedMediaType => ApiError::new(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Unsupported content-type. Use JSON or multipart/form-data.",
            ),
            AppError::Config(message) => ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, message),
            AppError::PaymentsDisabled => {
                ApiError::new(StatusCode::NOT_IMPLEMENTED, "Payments are disabled.")
                    .hint("Set CREEM_ENABLE_PAYMENTS=true to enable Creem checkouts.")
            }
            AppError::UpstreamStatus { service, status, body } => {
                ApiError::new(StatusCode::BAD_GATEWAY, format!("{} error: {}", service, status))
                    .detail(body)
            }
            AppError::UpstreamUnreachable { service, detail, .. } => {
                ApiError::new(StatusCode::BAD_GATEWAY, format!("Failed to reach {}.", service))
                    .detail(detail)
            }
            AppError::NoImages { debug } => {
                ApiError::new(StatusCode::BAD_GATEWAY, "No images returned from model.").debug(debug)
            }
            AppError::Auth(message) => ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, message),
            AppError::Network(e) => {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Server error.").detail(e.to_string())
            }
            AppError::Json(e) => {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Server error.").detail(e.to_string())
            }
            AppError::Unknown(message) => {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Server error.").detail(message)
            }
        }
    }
}
