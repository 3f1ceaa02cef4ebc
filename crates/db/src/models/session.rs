//! Session row model and join projection.

use gatehouse_core::session::{Session, SessionUser};
use gatehouse_core::types::{DbId, SessionId, Timestamp};
use sqlx::FromRow;

/// A row from the `sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub id: SessionId,
    pub user_id: DbId,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

/// A session joined with the owning user's public fields.
#[derive(Debug, Clone, FromRow)]
pub struct SessionWithUser {
    pub id: SessionId,
    pub user_id: DbId,
    pub expires_at: Timestamp,
    pub username: String,
}

impl SessionWithUser {
    /// Split into the domain session and its owner.
    pub fn into_parts(self) -> (Session, SessionUser) {
        (
            Session {
                id: self.id,
                user_id: self.user_id,
                expires_at: self.expires_at,
            },
            SessionUser {
                id: self.user_id,
                username: self.username,
            },
        )
    }
}
