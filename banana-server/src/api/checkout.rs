//! Checkout endpoints.
//!
//! `POST /api/checkout` creates a Creem checkout session; the response hints
//! are deliberately chatty because the common failure modes are all operator
//! misconfiguration (wrong-environment keys, swapped secret/product-id
//! values).

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use banana_core::checkout::{checkout_config_report, CheckoutConfigReport, CheckoutRequest};
use banana_core::AppError;

use super::auth::session_access_token;
use super::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct CheckoutResponse {
    #[serde(rename = "checkoutUrl")]
    pub checkout_url: String,
}

/// POST /api/checkout
pub async fn create_checkout(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<Value>, axum::extract::rejection::JsonRejection>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let origin = state.request_origin(&headers);

    let Ok(Json(body)) = body else {
        return Err(ApiError::bad_request("Invalid JSON body."));
    };
    let request: CheckoutRequest = serde_json::from_value(body)
        .map_err(|e| ApiError::bad_request("Invalid request.").detail(e.to_string()))?;
    request.validate().map_err(ApiError::from)?;

    let creem = &state.inner.config.creem;
    if !creem.enable_payments {
        return Err(AppError::PaymentsDisabled.into());
    }

    let plan = request.plan;
    let cycle = request.billing_cycle;
    let Some(product_id) = creem.product_id(plan, cycle) else {
        return Err(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Missing Creem product ID for this plan.",
        )
        .hint(format!(
            "Set the appropriate CREEM_*_PRODUCT_ID env var for plan={} billingCycle={}.",
            plan.as_str(),
            cycle.as_str()
        )));
    };
    let product_id = product_id.to_string();

    // Attach the signed-in user's email when a session is present; checkout
    // works without one.
    let customer_email = match session_access_token(&headers) {
        Some(token) => state.inner.auth.user_email(&token).await,
        None => None,
    };

    let request_id = uuid::Uuid::new_v4().to_string();
    let api_base_url = creem.api_base_url();
    let success_url = format!("{}/pricing/success?plan={}", origin, plan.as_str());

    let mut payload = json!({
        "product_id": product_id,
        "request_id": request_id,
        "units": request.units.unwrap_or(1),
        "success_url": success_url,
        "metadata": {
            "plan": plan.as_str(),
            "billingCycle": cycle.as_str(),
            "origin": origin,
        },
    });
    if let Some(email) = customer_email {
        payload["customer"] = json!({ "email": email });
    }

    info!(
        "[checkout] plan={} cycle={} units={} base={}",
        plan.as_str(),
        cycle.as_str(),
        request.units.unwrap_or(1),
        api_base_url
    );

    let response = match state.inner.creem.create_checkout(&payload).await {
        Ok(response) => response,
        Err(AppError::UpstreamStatus { status, body, .. }) => {
            let mut error = ApiError::new(
                StatusCode::BAD_GATEWAY,
                format!("Creem API error: {}", status),
            )
            .detail(body)
            .debug(json!({
                "creemApiBaseUrl": api_base_url,
                "productId": product_id,
                "plan": plan.as_str(),
                "billingCycle": cycle.as_str(),
            }));
            if status == 403 {
                error = error.hint(
                    "If you are using a test key (creem_test_*), set CREEM_API_BASE_URL=https://test-api.creem.io (or leave it unset). Also ensure product_id values match the same Creem environment.",
                );
            } else if status == 404 {
                error = error.hint(
                    "Creem returned Product not found. This almost always means the CREEM_*_PRODUCT_ID values are from a different Creem environment than your CREEM_API_KEY (test vs live), the ID is wrong, or you've accidentally pasted a webhook secret (whsec_*) into a product ID env var.",
                );
            }
            return Err(error);
        }
        Err(e) => return Err(e.into()),
    };

    let Some(checkout_url) = response.get("checkout_url").and_then(Value::as_str) else {
        return Err(ApiError::new(
            StatusCode::BAD_GATEWAY,
            "Creem response missing checkout_url.",
        ));
    };

    Ok(Json(CheckoutResponse {
        checkout_url: checkout_url.to_string(),
    }))
}

/// GET /api/checkout/config
pub async fn get_checkout_config(State(state): State<AppState>) -> Json<CheckoutConfigReport> {
    Json(checkout_config_report(&state.inner.config.creem))
}
