//! Repository for the `sessions` table.

use gatehouse_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::session::{SessionRow, SessionWithUser};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, expires_at, created_at";

/// Provides CRUD operations for sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    pub async fn create(
        pool: &PgPool,
        id: &str,
        user_id: DbId,
        expires_at: Timestamp,
    ) -> Result<SessionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (id, user_id, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SessionRow>(&query)
            .bind(id)
            .bind(user_id)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a session by its hashed id, joined with the owning user.
    ///
    /// Expired rows are returned as-is; expiry is decided by the caller.
    pub async fn find_with_user(
        pool: &PgPool,
        id: &str,
    ) -> Result<Option<SessionWithUser>, sqlx::Error> {
        sqlx::query_as::<_, SessionWithUser>(
            "SELECT s.id, s.user_id, s.expires_at, u.username
             FROM sessions s
             INNER JOIN users u ON u.id = s.user_id
             WHERE s.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Push `expires_at` forward, never backwards.
    ///
    /// Returns the stored expiry, or `None` if the row no longer exists.
    pub async fn extend_expiry(
        pool: &PgPool,
        id: &str,
        expires_at: Timestamp,
    ) -> Result<Option<Timestamp>, sqlx::Error> {
        let row: Option<(Timestamp,)> = sqlx::query_as(
            "UPDATE sessions SET expires_at = GREATEST(expires_at, $2)
             WHERE id = $1
             RETURNING expires_at",
        )
        .bind(id)
        .bind(expires_at)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(ts,)| ts))
    }

    /// Delete a single session. Returns `true` if the row existed.
    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete all sessions for a user. Returns the count of deleted rows.
    pub async fn delete_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete sessions that expired at or before `now`. Returns the count of deleted rows.
    pub async fn delete_expired(pool: &PgPool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
