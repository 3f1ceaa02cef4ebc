//! The `auth-session` cookie: reading the token from requests and building
//! the `Set-Cookie` values that issue, refresh and clear it.
//!
//! Every cookie written here is `Path=/; HttpOnly; SameSite=Lax`, with
//! `Secure` controlled by configuration. `Expires` always equals the
//! session's `expires_at` so the browser drops the cookie exactly when the
//! store would reject it.

use axum::http::header::{InvalidHeaderValue, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use ::cookie::{Cookie, SameSite};
use gatehouse_core::types::Timestamp;
use time::error::ComponentRange;
use time::OffsetDateTime;

/// Name of the cookie carrying the raw session token.
pub const SESSION_COOKIE_NAME: &str = "auth-session";

/// Build the cookie that hands `token` to the client until `expires_at`.
///
/// Fails when `expires_at` has no `Expires` representation.
pub fn session_cookie(
    token: &str,
    expires_at: Timestamp,
    secure: bool,
) -> Result<Cookie<'static>, ComponentRange> {
    let expires = OffsetDateTime::from_unix_timestamp(expires_at.timestamp())?;

    Ok(Cookie::build((SESSION_COOKIE_NAME, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .expires(expires)
        .build())
}

/// Build the cookie that deletes the session cookie on the client.
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .build()
}

/// Render a cookie as a `Set-Cookie` header value.
pub fn to_header_value(cookie: &Cookie<'_>) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&cookie.to_string())
}

/// Extract the session token from the request's `Cookie` headers.
///
/// Empty values are treated as absent.
pub fn read_session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == SESSION_COOKIE_NAME && !c.value().is_empty())
        .map(|c| c.value().to_string())
}

/// Whether a response already writes the session cookie.
pub fn sets_session_cookie(headers: &HeaderMap) -> bool {
    let prefix = format!("{SESSION_COOKIE_NAME}=");
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.starts_with(&prefix))
}
