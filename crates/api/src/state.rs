use std::sync::Arc;

use gatehouse_core::session::SessionManager;
use gatehouse_core::user::UserStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (cookie flags, allowed origin, timeouts).
    pub config: Arc<ServerConfig>,
    /// Session lifecycle over the configured session store.
    pub sessions: Arc<SessionManager>,
    /// Credential lookup and registration.
    pub users: Arc<dyn UserStore>,
}
