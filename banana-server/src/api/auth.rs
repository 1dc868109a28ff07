//! OAuth sign-in/callback/sign-out, delegating to the external auth provider.
//!
//! The server never sees provider credentials beyond the anon key: sign-in
//! redirects the browser to the provider, the callback trades the returned
//! code for a session, and the session rides in HttpOnly cookies.

use axum::extract::{Query, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::HeaderMap;
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use serde::Deserialize;

use super::error::ApiError;
use crate::state::AppState;

const ACCESS_COOKIE: &str = "sb-access-token";
const REFRESH_COOKIE: &str = "sb-refresh-token";
/// Session cookie lifetime: one week.
const COOKIE_MAX_AGE_SECS: u64 = 7 * 24 * 60 * 60;

/// Pull the session access token out of the request cookies, if any.
pub fn session_access_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|c| c.strip_prefix("sb-access-token="))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Post-auth redirect targets must stay on this site; anything that is not a
/// plain absolute path goes home instead.
fn sanitize_next(next: Option<&str>) -> String {
    match next {
        Some(n) if n.starts_with('/') && !n.starts_with("//") => n.to_string(),
        _ => "/".to_string(),
    }
}

fn session_cookie(name: &str, value: &str, secure: bool) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
        name,
        value,
        COOKIE_MAX_AGE_SECS,
        if secure { "; Secure" } else { "" }
    )
}

fn expired_cookie(name: &str) -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", name)
}

#[derive(Deserialize)]
pub struct SignInQuery {
    pub next: Option<String>,
}

/// GET /auth/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SignInQuery>,
) -> Result<Redirect, ApiError> {
    let origin = state.request_origin(&headers);
    let next = sanitize_next(query.next.as_deref());
    let encoded_next: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
    let redirect_to = format!("{}/auth/callback?next={}", origin, encoded_next);

    let authorize_url = state.inner.auth.authorize_url(&redirect_to)?;
    Ok(Redirect::temporary(&authorize_url))
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub next: Option<String>,
}

/// GET /auth/callback
pub async fn handle_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, ApiError> {
    let next = sanitize_next(query.next.as_deref());

    let Some(code) = query.code else {
        return Ok(Redirect::temporary("/").into_response());
    };

    let session = state.inner.auth.exchange_code(&code).await?;

    let secure = state.request_origin(&headers).starts_with("https://");
    let cookies = AppendHeaders([
        (SET_COOKIE, session_cookie(ACCESS_COOKIE, &session.access_token, secure)),
        (SET_COOKIE, session_cookie(REFRESH_COOKIE, &session.refresh_token, secure)),
    ]);

    Ok((cookies, Redirect::temporary(&next)).into_response())
}

/// POST /auth/sign-out
pub async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_access_token(&headers) {
        state.inner.auth.sign_out(&token).await;
    }

    let cookies = AppendHeaders([
        (SET_COOKIE, expired_cookie(ACCESS_COOKIE)),
        (SET_COOKIE, expired_cookie(REFRESH_COOKIE)),
    ]);

    // 303: the browser must follow with a GET.
    (cookies, Redirect::to("/")).into_response()
}
