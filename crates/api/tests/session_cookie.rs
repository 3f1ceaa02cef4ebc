//! Integration tests for the request authenticator: cookie resolution,
//! sliding renewal and stale cookie cleanup.

mod common;

use axum::http::StatusCode;
use chrono::Duration;
use common::{body_json, clears_session_cookie, session_set_cookie, session_token, TestApp};
use gatehouse_core::token::session_id_for;

#[tokio::test]
async fn fresh_session_is_not_rewritten() {
    let app = TestApp::new();
    let token = app.register("alice").await;

    app.clock.advance(Duration::days(10));
    let response = app.get("/api/v1/auth/session", Some(&token)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_set_cookie(&response).is_none());
    let stored = app.store.get_session(&session_id_for(&token)).await.unwrap();
    assert_eq!(stored.expires_at, common::t0() + Duration::days(30));
}

#[tokio::test]
async fn renewal_refreshes_cookie_expiry() {
    let app = TestApp::new();
    let token = app.register("alice").await;

    app.clock.advance(Duration::days(16));
    let response = app.get("/api/v1/auth/session", Some(&token)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_set_cookie(&response).expect("refreshed cookie");
    assert!(cookie.contains("Expires=Fri, 16 Feb 2024 12:00:00 GMT"));
    assert_eq!(session_token(&response).as_deref(), Some(token.as_str()));

    let json = body_json(response).await;
    assert_eq!(json["expires_at"], "2024-02-16T12:00:00Z");

    let stored = app.store.get_session(&session_id_for(&token)).await.unwrap();
    assert_eq!(stored.expires_at, common::t0() + Duration::days(46));
}

#[tokio::test]
async fn expired_session_clears_cookie_and_row() {
    let app = TestApp::new();
    let token = app.register("alice").await;

    app.clock.advance(Duration::days(31));
    let response = app.get("/api/v1/auth/session", Some(&token)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(clears_session_cookie(&response));
    assert!(app.store.get_session(&session_id_for(&token)).await.is_none());
}

#[tokio::test]
async fn unknown_token_clears_cookie_on_public_routes() {
    let app = TestApp::new();
    let response = app.get("/health", Some("not-a-real-token")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(clears_session_cookie(&response));
}

#[tokio::test]
async fn no_cookie_means_no_cookie_written() {
    let app = TestApp::new();
    let response = app.get("/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_set_cookie(&response).is_none());
}

#[tokio::test]
async fn logout_of_a_renewed_session_writes_one_cookie() {
    let app = TestApp::new();
    let token = app.register("alice").await;

    app.clock.advance(Duration::days(20));
    let response = app.post("/api/v1/auth/logout", Some(&token)).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    // session_set_cookie asserts a single session cookie.
    assert!(clears_session_cookie(&response));
}

#[tokio::test]
async fn login_replaces_a_stale_cookie() {
    let app = TestApp::new();
    let stale = app.register("alice").await;
    app.clock.advance(Duration::days(31));

    let response = app
        .post_json(
            "/api/v1/auth/login",
            serde_json::json!({ "username": "alice", "password": common::PASSWORD }),
            Some(&stale),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let fresh = session_token(&response).expect("new session cookie");
    assert_ne!(fresh, stale);
}
