//! API Routes
//!
//! JSON endpoints under /api plus the redirect-based /auth flow.

pub mod auth;
mod checkout;
mod error;
mod generate;

#[cfg(test)]
mod auth_tests;
#[cfg(test)]
mod checkout_tests;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generate::handle_generate))
        .route("/checkout", post(checkout::create_checkout))
        .route("/checkout/config", get(checkout::get_checkout_config))
        // API fallback: return 404 for unknown API endpoints
        .fallback(api_not_found)
}

pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/sign-in", get(auth::sign_in))
        .route("/callback", get(auth::handle_callback))
        .route("/sign-out", post(auth::sign_out))
}

async fn api_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(serde_json::json!({"error": "Not found"})))
}
