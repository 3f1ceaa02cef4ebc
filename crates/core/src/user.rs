//! User lookup and creation contract used by the login/register flow.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::session::SessionUser;
use crate::types::DbId;

/// A user row including the stored password digest.
///
/// Never serialize this; expose [`SessionUser`] instead.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: DbId,
    pub username: String,
    pub password_hash: String,
}

impl UserCredentials {
    pub fn to_session_user(&self) -> SessionUser {
        SessionUser {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

/// Persistence contract for users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by exact username.
    async fn find_by_username(&self, username: &str)
        -> Result<Option<UserCredentials>, StoreError>;

    /// Create a user. Fails with [`StoreError::Conflict`] if the username is
    /// already taken.
    async fn create(&self, username: &str, password_hash: &str)
        -> Result<SessionUser, StoreError>;
}
