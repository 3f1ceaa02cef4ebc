//! Best-effort notification port for "log out everywhere".
//!
//! When all of a user's sessions are invalidated, other services holding
//! their own sessions for that user may be told about it. Delivery is
//! best-effort: [`crate::session::SessionManager`] bounds each call with a
//! timeout and only logs failures.

use async_trait::async_trait;

use crate::types::DbId;

/// Error returned by a [`RevocationNotifier`].
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The remote side could not be reached.
    #[error("Notification request failed: {0}")]
    Request(String),

    /// The remote side answered with a non-success status.
    #[error("Notification rejected with HTTP {0}")]
    HttpStatus(u16),
}

/// Receives "all sessions of this user were revoked" events.
#[async_trait]
pub trait RevocationNotifier: Send + Sync {
    async fn user_sessions_revoked(&self, user_id: DbId) -> Result<(), NotifyError>;
}
