use async_trait::async_trait;

use super::{Session, SessionUser};
use crate::error::StoreError;
use crate::types::{DbId, Timestamp};

/// Persistence contract for sessions.
///
/// Every method must be atomic at the store layer. The manager never holds
/// an in-process lock across calls.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new session row.
    async fn insert(&self, session: &Session) -> Result<(), StoreError>;

    /// Look up a session joined with its owning user.
    async fn select_by_hashed_id(
        &self,
        id: &str,
    ) -> Result<Option<(Session, SessionUser)>, StoreError>;

    /// Raise `expires_at` to `max(current, expires_at)` and return the stored
    /// value, or `None` if the row no longer exists.
    async fn update_expiry(
        &self,
        id: &str,
        expires_at: Timestamp,
    ) -> Result<Option<Timestamp>, StoreError>;

    /// Delete one session. Returns `true` if a row was removed.
    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError>;

    /// Delete every session belonging to `user_id`. Returns the count removed.
    async fn delete_by_user_id(&self, user_id: DbId) -> Result<u64, StoreError>;

    /// Delete every session with `expires_at <= now`. Returns the count removed.
    async fn delete_expired(&self, now: Timestamp) -> Result<u64, StoreError>;

    /// Cheap reachability probe for health reporting.
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// First characters of a session id, for log correlation.
pub(crate) fn id_prefix(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
