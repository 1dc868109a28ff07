//! Test helpers for banana-server unit tests.

use url::Url;

use banana_core::config::AppConfig;

use crate::state::AppState;

/// Create an `AppState` from the given config with a localhost fallback
/// origin.
pub fn test_app_state(config: AppConfig) -> AppState {
    let fallback_origin = Url::parse("http://127.0.0.1:3000").expect("fallback origin parses");
    AppState::new(config, fallback_origin).expect("failed to create test AppState")
}

/// Test server over the full router (layers included).
pub fn test_server(config: AppConfig) -> axum_test::TestServer {
    let app = crate::router::build_router(test_app_state(config));
    axum_test::TestServer::new(app).expect("failed to start TestServer")
}
