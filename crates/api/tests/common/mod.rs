#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, ORIGIN, SET_COOKIE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::{TimeZone, Utc};
use gatehouse_api::config::ServerConfig;
use gatehouse_api::router::build_app_router;
use gatehouse_api::state::AppState;
use gatehouse_core::clock::ManualClock;
use gatehouse_core::memory::MemoryStore;
use gatehouse_core::notify::RevocationNotifier;
use gatehouse_core::session::SessionManager;
use gatehouse_core::types::Timestamp;
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Origin accepted by the test configuration.
pub const TEST_ORIGIN: &str = "http://localhost:5173";

pub const PASSWORD: &str = "correct-horse";

/// Fixed start time of every test clock.
pub fn t0() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

/// Build a test `ServerConfig` with the development defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig::from_lookup(|_| None)
}

/// The full application router over in-memory stores and a manual clock.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub sessions: Arc<SessionManager>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(None)
    }

    pub fn with_notifier(notifier: Arc<dyn RevocationNotifier>) -> Self {
        Self::build(Some(notifier))
    }

    fn build(notifier: Option<Arc<dyn RevocationNotifier>>) -> Self {
        let config = test_config();
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(t0()));

        let mut manager = SessionManager::new(store.clone(), config.session.policy().unwrap())
            .with_clock(clock.clone());
        if let Some(notifier) = notifier {
            manager = manager.with_notifier(notifier, Duration::from_secs(1));
        }
        let sessions = Arc::new(manager);

        let state = AppState {
            config: Arc::new(config.clone()),
            sessions: sessions.clone(),
            users: store.clone(),
        };

        Self {
            router: build_app_router(state, &config),
            store,
            clock,
            sessions,
        }
    }

    /// Send a request through the full middleware stack.
    ///
    /// State-changing requests carry the allowed `Origin` header.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method.clone()).uri(uri);
        if method != Method::GET {
            builder = builder.header(ORIGIN, TEST_ORIGIN);
        }
        if let Some(token) = token {
            builder = builder.header(COOKIE, format!("auth-session={token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&json).unwrap())
            }
            None => Body::empty(),
        };
        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        body: serde_json::Value,
        token: Option<&str>,
    ) -> Response {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>) -> Response {
        self.send(Method::POST, uri, token, None).await
    }

    /// Register `username` with [`PASSWORD`] and return the issued token.
    pub async fn register(&self, username: &str) -> String {
        let response = self
            .post_json(
                "/api/v1/auth/register",
                serde_json::json!({ "username": username, "password": PASSWORD }),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        session_token(&response).expect("register must set the session cookie")
    }

    /// Log `username` in with [`PASSWORD`] and return the issued token.
    pub async fn login(&self, username: &str) -> String {
        let response = self
            .post_json(
                "/api/v1/auth/login",
                serde_json::json!({ "username": username, "password": PASSWORD }),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        session_token(&response).expect("login must set the session cookie")
    }
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Every `Set-Cookie` value for the session cookie.
pub fn session_set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter(|v| v.starts_with("auth-session="))
        .map(str::to_string)
        .collect()
}

/// The single session `Set-Cookie` value, if any.
pub fn session_set_cookie(response: &Response) -> Option<String> {
    let mut cookies = session_set_cookies(response);
    assert!(cookies.len() <= 1, "session cookie written twice: {cookies:?}");
    cookies.pop()
}

/// The token carried by the session `Set-Cookie`, if non-empty.
pub fn session_token(response: &Response) -> Option<String> {
    let header = session_set_cookie(response)?;
    let value = header
        .strip_prefix("auth-session=")?
        .split(';')
        .next()?
        .to_string();
    (!value.is_empty()).then_some(value)
}

/// Whether the response clears the session cookie.
pub fn clears_session_cookie(response: &Response) -> bool {
    session_set_cookie(response)
        .is_some_and(|c| c.starts_with("auth-session=;") && c.contains("Max-Age=0"))
}

/// GET `uri` on an arbitrary router, optionally with a session token.
pub async fn oneshot_get(router: Router, uri: &str, token: Option<&str>) -> Response {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(COOKIE, format!("auth-session={token}"));
    }
    router
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}
