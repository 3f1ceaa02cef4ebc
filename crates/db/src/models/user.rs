//! User entity model and DTOs.

use gatehouse_core::session::SessionUser;
use gatehouse_core::types::{DbId, Timestamp};
use gatehouse_core::user::UserCredentials;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub password_hash: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new user.
#[derive(Debug)]
pub struct CreateUser {
    pub username: String,
    pub password_hash: String,
}

impl From<User> for UserCredentials {
    fn from(user: User) -> Self {
        UserCredentials {
            id: user.id,
            username: user.username,
            password_hash: user.password_hash,
        }
    }
}

impl From<User> for SessionUser {
    fn from(user: User) -> Self {
        SessionUser {
            id: user.id,
            username: user.username,
        }
    }
}
