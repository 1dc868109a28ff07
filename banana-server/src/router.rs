use axum::{
    extract::DefaultBodyLimit, http::StatusCode, response::IntoResponse, routing::get, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::api;
use crate::state::AppState;

/// 9 images of a few MiB each plus JSON overhead. Also enforced when a
/// handler reads a raw body itself.
pub(crate) const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let static_dir = std::env::var("BANANA_STATIC_DIR").unwrap_or_else(|_| "./public".to_string());

    let routes = Router::new()
        .nest("/api", api::router())
        .nest("/auth", api::auth_router())
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
        .with_state(state);

    // Front-end fallback: unmatched paths serve the static site, unknown
    // pages fall back to index.html.
    let index_path = format!("{}/index.html", static_dir);
    let static_service = ServeDir::new(&static_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(&index_path));

    routes
        .fallback_service(static_service)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, axum::Json(serde_json::json!({"status": "ok"})))
}
