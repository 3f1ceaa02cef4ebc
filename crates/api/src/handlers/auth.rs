//! Handlers for the `/auth` resource (register, login, logout, logout-all, session).

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::Json;
use gatehouse_core::error::{CoreError, StoreError};
use gatehouse_core::session::{Session, SessionUser};
use gatehouse_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::auth::cookie::{removal_cookie, session_cookie, to_header_value};
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Message for both unknown usernames and wrong passwords.
const INVALID_CREDENTIALS: &str = "Incorrect username or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register` and `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsForm {
    #[validate(
        length(min = 3, max = 31, message = "Username must be 3 to 31 characters"),
        custom(function = "validate_username_charset")
    )]
    pub username: String,
    #[validate(length(min = 6, max = 255, message = "Password must be 6 to 255 characters"))]
    pub password: String,
}

/// Current user and session expiry, returned by register, login and session.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: SessionUser,
    pub expires_at: Timestamp,
}

type CookieHeader = [(HeaderName, HeaderValue); 1];

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create an account and sign it in. Returns 409 when the username is taken.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<CredentialsForm>,
) -> AppResult<(StatusCode, CookieHeader, Json<SessionResponse>)> {
    validate_form(&input)?;

    if state.users.find_by_username(&input.username).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Username already used".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    // A concurrent registration can still win between the lookup and the insert.
    let user = state
        .users
        .create(&input.username, &password_hash)
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => {
                AppError::Core(CoreError::Conflict("Username already used".into()))
            }
            other => AppError::Store(other),
        })?;
    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    let (cookie, session) = start_session(&state, user.id).await?;

    Ok((
        StatusCode::CREATED,
        cookie,
        Json(SessionResponse {
            user,
            expires_at: session.expires_at,
        }),
    ))
}

/// POST /api/v1/auth/login
///
/// Authenticate with username + password and issue a session cookie.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<CredentialsForm>,
) -> AppResult<(CookieHeader, Json<SessionResponse>)> {
    validate_form(&input)?;

    let credentials = state
        .users
        .find_by_username(&input.username)
        .await?
        .ok_or_else(invalid_credentials)?;

    let password_valid = verify_password(&input.password, &credentials.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        tracing::info!(user_id = credentials.id, "Login rejected: wrong password");
        return Err(invalid_credentials());
    }

    let (cookie, session) = start_session(&state, credentials.id).await?;
    tracing::info!(user_id = credentials.id, "User logged in");

    Ok((
        cookie,
        Json(SessionResponse {
            user: credentials.to_session_user(),
            expires_at: session.expires_at,
        }),
    ))
}

/// POST /api/v1/auth/logout
///
/// Invalidate the current session and clear the cookie.
pub async fn logout(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<(StatusCode, CookieHeader)> {
    state.sessions.invalidate_session(&auth.session.id).await?;
    Ok((StatusCode::NO_CONTENT, clear_cookie(&state)?))
}

/// POST /api/v1/auth/logout-all
///
/// Invalidate every session of the current user, on every device.
pub async fn logout_all(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<(StatusCode, CookieHeader)> {
    let removed = state.sessions.invalidate_all_sessions(auth.user.id).await?;
    tracing::info!(user_id = auth.user.id, removed, "Logged out everywhere");
    Ok((StatusCode::NO_CONTENT, clear_cookie(&state)?))
}

/// GET /api/v1/auth/session
///
/// Return the authenticated user and the session's current expiry.
pub async fn current_session(auth: AuthUser) -> Json<SessionResponse> {
    Json(SessionResponse {
        user: auth.user,
        expires_at: auth.session.expires_at,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_username_charset(username: &str) -> Result<(), ValidationError> {
    let valid = username
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-');
    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("username_charset");
        err.message =
            Some("Username may only contain lowercase letters, digits, '_' and '-'".into());
        Err(err)
    }
}

fn validate_form(input: &CredentialsForm) -> Result<(), AppError> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into()))
}

/// Create a session for `user_id` and build the cookie carrying its token.
///
/// The cookie is only produced once the session row is stored.
async fn start_session(state: &AppState, user_id: DbId) -> AppResult<(CookieHeader, Session)> {
    let token = state.sessions.generate_token();
    let session = state.sessions.create_session(&token, user_id).await?;
    let cookie = session_cookie(
        token.as_str(),
        session.expires_at,
        state.config.session.cookie_secure,
    )
    .map_err(|e| AppError::InternalError(format!("Session expiry out of cookie range: {e}")))?;
    Ok((cookie_header(&cookie)?, session))
}

fn clear_cookie(state: &AppState) -> AppResult<CookieHeader> {
    cookie_header(&removal_cookie(state.config.session.cookie_secure))
}

fn cookie_header(cookie: &::cookie::Cookie<'_>) -> AppResult<CookieHeader> {
    let value = to_header_value(cookie)
        .map_err(|e| AppError::InternalError(format!("Invalid cookie header: {e}")))?;
    Ok([(SET_COOKIE, value)])
}
