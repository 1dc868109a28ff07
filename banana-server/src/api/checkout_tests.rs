use axum::http::StatusCode;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use banana_core::config::{AppConfig, CreemConfig};

use crate::test_helpers::test_server;

fn paid_config(api_base_url: &str) -> AppConfig {
    let id = |name: &str| Some(format!("prod_{}_0123456789", name));
    AppConfig {
        creem: CreemConfig {
            api_key: Some("creem_live_key".to_string()),
            api_base_url: Some(api_base_url.to_string()),
            enable_payments: true,
            webhook_secret: Some("whsec_secret".to_string()),
            basic_monthly: id("basic_m"),
            basic_yearly: id("basic_y"),
            pro_monthly: id("pro_m"),
            pro_yearly: id("pro_y"),
            max_monthly: id("max_m"),
            max_yearly: id("max_y"),
            pack_starter: id("pack_s"),
            pack_growth: id("pack_g"),
            pack_professional: id("pack_p"),
            pack_enterprise: id("pack_e"),
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn malformed_json_body_is_400() {
    let server = test_server(paid_config("http://127.0.0.1:9"));

    let response = server
        .post("/api/checkout")
        .content_type("application/json")
        .bytes("{oops".into())
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid JSON body.");
}

#[tokio::test]
async fn unknown_plan_is_400() {
    let server = test_server(paid_config("http://127.0.0.1:9"));

    let response = server
        .post("/api/checkout")
        .json(&json!({ "plan": "diamond", "billingCycle": "monthly" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid request.");
}

#[tokio::test]
async fn out_of_range_units_is_400() {
    let server = test_server(paid_config("http://127.0.0.1:9"));

    let response = server
        .post("/api/checkout")
        .json(&json!({ "plan": "starter_pack", "billingCycle": "once", "units": 1001 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn disabled_payments_is_501_with_hint() {
    let mut config = paid_config("http://127.0.0.1:9");
    config.creem.enable_payments = false;
    let server = test_server(config);

    let response = server
        .post("/api/checkout")
        .json(&json!({ "plan": "pro", "billingCycle": "monthly" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_IMPLEMENTED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Payments are disabled.");
    assert_eq!(body["hint"], "Set CREEM_ENABLE_PAYMENTS=true to enable Creem checkouts.");
}

#[tokio::test]
async fn missing_product_id_is_500_with_hint() {
    let mut config = paid_config("http://127.0.0.1:9");
    config.creem.pro_yearly = None;
    let server = test_server(config);

    let response = server
        .post("/api/checkout")
        .json(&json!({ "plan": "pro", "billingCycle": "yearly" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Missing Creem product ID for this plan.");
    assert_eq!(
        body["hint"],
        "Set the appropriate CREEM_*_PRODUCT_ID env var for plan=pro billingCycle=yearly."
    );
}

#[tokio::test]
async fn successful_checkout_returns_checkout_url() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/checkouts"))
        .and(header("x-api-key", "creem_live_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "checkout_url": "https://pay.creem.io/session/abc"
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = test_server(paid_config(&upstream.uri()));

    let response = server
        .post("/api/checkout")
        .json(&json!({ "plan": "pro", "billingCycle": "monthly", "units": 2 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body, json!({ "checkoutUrl": "https://pay.creem.io/session/abc" }));

    let requests = upstream.received_requests().await.unwrap();
    let payload: Value = requests[0].body_json().unwrap();
    assert_eq!(payload["product_id"], "prod_pro_m_0123456789");
    assert_eq!(payload["units"], 2);
    assert_eq!(payload["metadata"]["plan"], "pro");
    assert_eq!(payload["metadata"]["billingCycle"], "monthly");
    let success_url = payload["success_url"].as_str().unwrap();
    assert!(success_url.ends_with("/pricing/success?plan=pro"), "got {}", success_url);
    // No session cookie was sent, so no customer block rides along.
    assert!(payload.get("customer").is_none());
}

#[tokio::test]
async fn creem_not_found_maps_to_502_with_hint_and_debug() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/checkouts"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Product not found"))
        .mount(&upstream)
        .await;

    let server = test_server(paid_config(&upstream.uri()));

    let response = server
        .post("/api/checkout")
        .json(&json!({ "plan": "max", "billingCycle": "yearly" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["error"], "Creem API error: 404");
    assert_eq!(body["detail"], "Product not found");
    assert!(body["hint"].as_str().unwrap().contains("different Creem environment"));
    assert_eq!(body["debug"]["productId"], "prod_max_y_0123456789");
    assert_eq!(body["debug"]["plan"], "max");
}

#[tokio::test]
async fn missing_checkout_url_in_2xx_is_502() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/checkouts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "chk_1" })))
        .mount(&upstream)
        .await;

    let server = test_server(paid_config(&upstream.uri()));

    let response = server
        .post("/api/checkout")
        .json(&json!({ "plan": "basic", "billingCycle": "monthly" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["error"], "Creem response missing checkout_url.");
}

#[tokio::test]
async fn config_report_flags_missing_configuration() {
    let mut config = paid_config("http://127.0.0.1:9");
    config.creem.api_key = None;
    config.creem.pack_growth = None;
    let server = test_server(config);

    let response = server.get("/api/checkout/config").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["ready"], false);
    let missing: Vec<String> = body["missing"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert!(missing.contains(&"CREEM_API_KEY".to_string()));
    assert!(missing.contains(&"CREEM_CREDIT_PACK_GROWTH_PRODUCT_ID".to_string()));
    assert_eq!(body["plans"]["pro"]["monthly"], true);
    assert_eq!(body["packs"]["growth_pack"], false);
    assert_eq!(body["packs"]["starter_pack"], true);
}

#[tokio::test]
async fn fully_configured_report_is_ready() {
    let server = test_server(paid_config("http://127.0.0.1:9"));

    let response = server.get("/api/checkout/config").await;

    let body: Value = response.json();
    assert_eq!(body["ready"], true);
    assert_eq!(body["missing"], json!([]));
    assert_eq!(body["plans"]["max"]["yearly"], true);
}
