//! Same-origin check for state-changing requests.

use axum::extract::{Request, State};
use axum::http::header::ORIGIN;
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::state::AppState;

/// Reject non-safe requests whose `Origin` differs from the configured one.
pub async fn check_origin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if is_safe(request.method()) {
        return next.run(request).await;
    }

    let origin = request
        .headers()
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok());

    if origin == Some(state.config.allowed_origin.as_str()) {
        return next.run(request).await;
    }

    tracing::warn!(
        method = %request.method(),
        path = %request.uri().path(),
        origin = origin.unwrap_or("<none>"),
        "Origin check failed"
    );
    (
        StatusCode::FORBIDDEN,
        axum::Json(json!({ "error": "CSRF check failed" })),
    )
        .into_response()
}

fn is_safe(method: &Method) -> bool {
    method == Method::GET || method == Method::HEAD || method == Method::OPTIONS
}
