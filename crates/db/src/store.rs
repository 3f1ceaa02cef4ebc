//! PostgreSQL adapters for the core store ports.

use async_trait::async_trait;
use gatehouse_core::error::StoreError;
use gatehouse_core::session::{Session, SessionStore, SessionUser};
use gatehouse_core::types::{DbId, Timestamp};
use gatehouse_core::user::{UserCredentials, UserStore};

use crate::models::user::CreateUser;
use crate::repositories::{SessionRepo, UserRepo};
use crate::DbPool;

/// PostgreSQL unique constraint violation.
const PG_UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL foreign key violation.
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

/// [`SessionStore`] and [`UserStore`] backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map a sqlx error onto the store error vocabulary.
///
/// Constraint violations become [`StoreError::Conflict`]; everything else is
/// reported as [`StoreError::Unavailable`].
pub fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let code = db_err.code();
        if matches!(
            code.as_deref(),
            Some(PG_UNIQUE_VIOLATION) | Some(PG_FOREIGN_KEY_VIOLATION)
        ) {
            let constraint = db_err.constraint().unwrap_or("unknown");
            return StoreError::Conflict(format!("constraint {constraint} violated"));
        }
    }
    tracing::error!(error = %err, "Database error");
    StoreError::Unavailable(err.to_string())
}

#[async_trait]
impl SessionStore for PgStore {
    async fn insert(&self, session: &Session) -> Result<(), StoreError> {
        SessionRepo::create(&self.pool, &session.id, session.user_id, session.expires_at)
            .await
            .map(|_| ())
            .map_err(map_sqlx_error)
    }

    async fn select_by_hashed_id(
        &self,
        id: &str,
    ) -> Result<Option<(Session, SessionUser)>, StoreError> {
        let row = SessionRepo::find_with_user(&self.pool, id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(|r| r.into_parts()))
    }

    async fn update_expiry(
        &self,
        id: &str,
        expires_at: Timestamp,
    ) -> Result<Option<Timestamp>, StoreError> {
        SessionRepo::extend_expiry(&self.pool, id, expires_at)
            .await
            .map_err(map_sqlx_error)
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
        SessionRepo::delete(&self.pool, id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn delete_by_user_id(&self, user_id: DbId) -> Result<u64, StoreError> {
        SessionRepo::delete_all_for_user(&self.pool, user_id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn delete_expired(&self, now: Timestamp) -> Result<u64, StoreError> {
        SessionRepo::delete_expired(&self.pool, now)
            .await
            .map_err(map_sqlx_error)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, StoreError> {
        let user = UserRepo::find_by_username(&self.pool, username)
            .await
            .map_err(map_sqlx_error)?;
        Ok(user.map(UserCredentials::from))
    }

    async fn create(&self, username: &str, password_hash: &str) -> Result<SessionUser, StoreError> {
        let input = CreateUser {
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        let user = UserRepo::create(&self.pool, &input)
            .await
            .map_err(map_sqlx_error)?;
        Ok(SessionUser::from(user))
    }
}
