//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use common::{body_json, TestApp};
use gatehouse_api::router::build_app_router;
use gatehouse_api::state::AppState;
use gatehouse_core::error::StoreError;
use gatehouse_core::memory::MemoryStore;
use gatehouse_core::session::{Session, SessionManager, SessionPolicy, SessionStore, SessionUser};
use gatehouse_core::types::{DbId, Timestamp};

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let app = TestApp::new();
    let response = app.get("/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["store_healthy"], true);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = TestApp::new();
    let response = app.get("/this-route-does-not-exist", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let app = TestApp::new();
    let response = app.get("/health", None).await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

/// A session store whose backend is down.
struct DownStore;

#[async_trait]
impl SessionStore for DownStore {
    async fn insert(&self, _: &Session) -> Result<(), StoreError> {
        Err(down())
    }
    async fn select_by_hashed_id(
        &self,
        _: &str,
    ) -> Result<Option<(Session, SessionUser)>, StoreError> {
        Err(down())
    }
    async fn update_expiry(&self, _: &str, _: Timestamp) -> Result<Option<Timestamp>, StoreError> {
        Err(down())
    }
    async fn delete_by_id(&self, _: &str) -> Result<bool, StoreError> {
        Err(down())
    }
    async fn delete_by_user_id(&self, _: DbId) -> Result<u64, StoreError> {
        Err(down())
    }
    async fn delete_expired(&self, _: Timestamp) -> Result<u64, StoreError> {
        Err(down())
    }
    async fn health_check(&self) -> Result<(), StoreError> {
        Err(down())
    }
}

fn down() -> StoreError {
    StoreError::Unavailable("connection refused".into())
}

fn down_app() -> axum::Router {
    let config = common::test_config();
    let state = AppState {
        config: Arc::new(config.clone()),
        sessions: Arc::new(SessionManager::new(Arc::new(DownStore), SessionPolicy::default())),
        users: Arc::new(MemoryStore::new()),
    };
    build_app_router(state, &config)
}

#[tokio::test]
async fn health_reports_degraded_store() {
    let router = down_app();
    let response = common::oneshot_get(router, "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["store_healthy"], false);
}

#[tokio::test]
async fn store_failure_during_authentication_is_500() {
    let router = down_app();
    let response = common::oneshot_get(router, "/api/v1/auth/session", Some("some-token")).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn requests_without_cookie_do_not_touch_the_store() {
    let router = down_app();
    let response = common::oneshot_get(router, "/api/v1/auth/session", None).await;

    // Unauthenticated, not a store failure.
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
