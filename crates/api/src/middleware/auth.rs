//! Cookie-based request authentication.
//!
//! [`authenticate`] runs once per request: it resolves the `auth-session`
//! cookie through the [`SessionManager`](gatehouse_core::session::SessionManager),
//! stores the outcome as an [`AuthState`] request extension, and keeps the
//! client cookie in step with the store (refreshed on renewal, cleared when
//! the session is gone). Handlers read the outcome through the [`AuthUser`]
//! and [`MaybeAuthUser`] extractors.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::SET_COOKIE;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use gatehouse_core::error::CoreError;
use gatehouse_core::session::{Session, SessionUser};

use crate::auth::cookie::{
    read_session_token, removal_cookie, session_cookie, sets_session_cookie, to_header_value,
};
use crate::error::AppError;
use crate::state::AppState;

/// Authentication outcome for the current request.
#[derive(Debug, Clone)]
pub enum AuthState {
    Unauthenticated,
    Authenticated { user: SessionUser, session: Session },
}

/// Cookie action decided before the handler runs.
enum CookieUpdate {
    None,
    Refresh(String, Session),
    Clear,
}

/// Resolve the session cookie and attach [`AuthState`] to the request.
///
/// Requests without the cookie never touch the store. A store failure
/// short-circuits with a 500 JSON error.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let (auth_state, update) = match read_session_token(request.headers()) {
        None => (AuthState::Unauthenticated, CookieUpdate::None),
        Some(token) => match state.sessions.validate_token(&token).await {
            Ok(Some(validated)) => {
                let update = if validated.renewed {
                    CookieUpdate::Refresh(token, validated.session.clone())
                } else {
                    CookieUpdate::None
                };
                (
                    AuthState::Authenticated {
                        user: validated.user,
                        session: validated.session,
                    },
                    update,
                )
            }
            Ok(None) => (AuthState::Unauthenticated, CookieUpdate::Clear),
            Err(e) => return AppError::Store(e).into_response(),
        },
    };

    request.extensions_mut().insert(auth_state);
    let mut response = next.run(request).await;

    // Handlers that write the cookie themselves (login, logout) win.
    if sets_session_cookie(response.headers()) {
        return response;
    }

    let secure = state.config.session.cookie_secure;
    let cookie = match update {
        CookieUpdate::None => return response,
        CookieUpdate::Refresh(token, session) => {
            match session_cookie(&token, session.expires_at, secure) {
                Ok(cookie) => cookie,
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        user_id = session.user_id,
                        "Session expiry cannot be written to the cookie"
                    );
                    return response;
                }
            }
        }
        CookieUpdate::Clear => removal_cookie(secure),
    };

    match to_header_value(&cookie) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode session cookie");
        }
    }
    response
}

/// Authenticated user and session for the current request.
///
/// Use this as an extractor parameter in any handler that requires a session:
///
/// ```ignore
/// async fn my_handler(auth: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = auth.user.id, "handling request");
///     Ok(Json(()))
/// }
/// ```
///
/// Rejects with 401 when the request carries no valid session.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: SessionUser,
    pub session: Session,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthState>() {
            Some(AuthState::Authenticated { user, session }) => Ok(AuthUser {
                user: user.clone(),
                session: session.clone(),
            }),
            _ => Err(AppError::Core(CoreError::Unauthorized(
                "Authentication required".into(),
            ))),
        }
    }
}

/// Like [`AuthUser`] but never rejects.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(
            AuthUser::from_request_parts(parts, state).await.ok(),
        ))
    }
}
