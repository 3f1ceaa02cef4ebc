//! Integration tests for the HTTP revocation notifier, against a local
//! receiver bound to an ephemeral port.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use assert_matches::assert_matches;
use common::TestApp;
use gatehouse_api::notify::HttpRevocationNotifier;
use gatehouse_core::notify::{NotifyError, RevocationNotifier};
use tokio::sync::Mutex;

type Received = Arc<Mutex<Vec<serde_json::Value>>>;

/// Start a receiver answering every POST with `status`. Returns its URL.
async fn spawn_receiver(status: StatusCode) -> (String, Received) {
    let received: Received = Arc::default();

    async fn record(
        State((received, status)): State<(Received, StatusCode)>,
        Json(body): Json<serde_json::Value>,
    ) -> StatusCode {
        received.lock().await.push(body);
        status
    }

    let app = Router::new()
        .route("/revoked", post(record))
        .with_state((received.clone(), status));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/revoked"), received)
}

#[tokio::test]
async fn notifier_posts_user_id() {
    let (url, received) = spawn_receiver(StatusCode::NO_CONTENT).await;
    let notifier = HttpRevocationNotifier::new(url, Duration::from_secs(2)).unwrap();

    notifier.user_sessions_revoked(42).await.unwrap();

    let bodies = received.lock().await;
    assert_eq!(bodies.as_slice(), [serde_json::json!({ "user_id": 42 })]);
}

#[tokio::test]
async fn notifier_reports_error_status() {
    let (url, _) = spawn_receiver(StatusCode::SERVICE_UNAVAILABLE).await;
    let notifier = HttpRevocationNotifier::new(url, Duration::from_secs(2)).unwrap();

    assert_matches!(
        notifier.user_sessions_revoked(7).await,
        Err(NotifyError::HttpStatus(503))
    );
}

#[tokio::test]
async fn logout_all_notifies_receiver() {
    let (url, received) = spawn_receiver(StatusCode::OK).await;
    let notifier = HttpRevocationNotifier::new(url, Duration::from_secs(2)).unwrap();
    let app = TestApp::with_notifier(Arc::new(notifier));

    let token = app.register("alice").await;
    let user_id = common::body_json(app.get("/api/v1/auth/session", Some(&token)).await).await
        ["user"]["id"]
        .clone();

    let response = app.post("/api/v1/auth/logout-all", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let bodies = received.lock().await;
    assert_eq!(bodies.as_slice(), [serde_json::json!({ "user_id": user_id })]);
}

#[tokio::test]
async fn failing_receiver_does_not_fail_logout_all() {
    let (url, received) = spawn_receiver(StatusCode::INTERNAL_SERVER_ERROR).await;
    let notifier = HttpRevocationNotifier::new(url, Duration::from_secs(2)).unwrap();
    let app = TestApp::with_notifier(Arc::new(notifier));

    let token = app.register("alice").await;
    let response = app.post("/api/v1/auth/logout-all", Some(&token)).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(received.lock().await.len(), 1);
    assert_eq!(app.store.session_count().await, 0);
}
