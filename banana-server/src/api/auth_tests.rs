use axum::http::StatusCode;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use banana_core::config::{AppConfig, SupabaseConfig};

use crate::test_helpers::test_server;

fn auth_config(provider_url: &str) -> AppConfig {
    AppConfig {
        supabase: SupabaseConfig {
            url: Some(provider_url.to_string()),
            anon_key: Some("anon-key".to_string()),
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn sign_in_redirects_to_provider_authorize_url() {
    let server = test_server(auth_config("https://project.supabase.co"));

    let response = server.get("/auth/sign-in").add_query_param("next", "/pricing").await;

    assert_eq!(response.status_code(), StatusCode::TEMPORARY_REDIRECT);
    let location = response.headers().get("location").unwrap().to_str().unwrap();
    assert!(location.starts_with("https://project.supabase.co/auth/v1/authorize?"));
    assert!(location.contains("provider=google"));
    assert!(location.contains("redirect_to="));
    assert!(location.contains("auth%2Fcallback"));
}

#[tokio::test]
async fn sign_in_without_provider_is_500() {
    let server = test_server(AppConfig::default());

    let response = server.get("/auth/sign-in").await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Missing SUPABASE_URL");
}

#[tokio::test]
async fn callback_without_code_redirects_home() {
    let server = test_server(auth_config("https://project.supabase.co"));

    let response = server.get("/auth/callback").await;

    assert_eq!(response.status_code(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers().get("location").unwrap(), "/");
}

#[tokio::test]
async fn callback_exchanges_code_and_sets_session_cookies() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "at-123",
            "refresh_token": "rt-456"
        })))
        .expect(1)
        .mount(&provider)
        .await;

    let server = test_server(auth_config(&provider.uri()));

    let response = server
        .get("/auth/callback")
        .add_query_param("code", "oauth-code")
        .add_query_param("next", "/pricing")
        .await;

    assert_eq!(response.status_code(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers().get("location").unwrap(), "/pricing");

    let cookies: Vec<&str> = response
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap())
        .collect();
    assert!(cookies.iter().any(|c| c.starts_with("sb-access-token=at-123") && c.contains("HttpOnly")));
    assert!(cookies.iter().any(|c| c.starts_with("sb-refresh-token=rt-456")));
}

#[tokio::test]
async fn failed_exchange_is_500() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid code"))
        .mount(&provider)
        .await;

    let server = test_server(auth_config(&provider.uri()));

    let response = server.get("/auth/callback").add_query_param("code", "bad").await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("code exchange failed"));
}

#[tokio::test]
async fn sign_out_clears_cookies_and_redirects_home() {
    let server = test_server(AppConfig::default());

    let response = server
        .post("/auth/sign-out")
        .add_header(
            axum::http::header::COOKIE,
            axum::http::HeaderValue::from_static("sb-access-token=at-123"),
        )
        .await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get("location").unwrap(), "/");

    let cookies: Vec<&str> = response
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap())
        .collect();
    assert!(cookies.iter().any(|c| c.starts_with("sb-access-token=;") && c.contains("Max-Age=0")));
    assert!(cookies.iter().any(|c| c.starts_with("sb-refresh-token=;") && c.contains("Max-Age=0")));
}
