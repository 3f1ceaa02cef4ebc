//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /register     -> register
/// POST /login        -> login
/// POST /logout       -> logout (requires session)
/// POST /logout-all   -> logout_all (requires session)
/// GET  /session      -> current_session (requires session)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/logout-all", post(auth::logout_all))
        .route("/session", get(auth::current_session))
}
