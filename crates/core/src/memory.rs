//! In-process session and user store.
//!
//! Backs the test suites and local development. A single [`RwLock`] guards
//! both tables and is held for the whole of each operation, which gives the
//! same per-operation atomicity the relational store provides per row.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::session::{Session, SessionStore, SessionUser};
use crate::types::{DbId, SessionId, Timestamp};
use crate::user::{UserCredentials, UserStore};

#[derive(Default)]
struct Tables {
    sessions: HashMap<SessionId, Session>,
    users: HashMap<DbId, UserCredentials>,
    last_user_id: DbId,
}

/// Memory-backed implementation of [`SessionStore`] and [`UserStore`].
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a session row without the user join.
    pub async fn get_session(&self, id: &str) -> Option<Session> {
        self.tables.read().await.sessions.get(id).cloned()
    }

    pub async fn session_count(&self) -> usize {
        self.tables.read().await.sessions.len()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert(&self, session: &Session) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&session.user_id) {
            return Err(StoreError::Conflict(format!(
                "session references unknown user {}",
                session.user_id
            )));
        }
        if tables.sessions.contains_key(&session.id) {
            return Err(StoreError::Conflict("duplicate session id".into()));
        }
        tables.sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn select_by_hashed_id(
        &self,
        id: &str,
    ) -> Result<Option<(Session, SessionUser)>, StoreError> {
        let tables = self.tables.read().await;
        let joined = tables.sessions.get(id).and_then(|session| {
            tables
                .users
                .get(&session.user_id)
                .map(|user| (session.clone(), user.to_session_user()))
        });
        Ok(joined)
    }

    async fn update_expiry(
        &self,
        id: &str,
        expires_at: Timestamp,
    ) -> Result<Option<Timestamp>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.sessions.get_mut(id).map(|session| {
            session.expires_at = session.expires_at.max(expires_at);
            session.expires_at
        }))
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.sessions.remove(id).is_some())
    }

    async fn delete_by_user_id(&self, user_id: DbId) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| s.user_id != user_id);
        Ok((before - tables.sessions.len()) as u64)
    }

    async fn delete_expired(&self, now: Timestamp) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| s.expires_at > now);
        Ok((before - tables.sessions.len()) as u64)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create(&self, username: &str, password_hash: &str) -> Result<SessionUser, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == username) {
            return Err(StoreError::Conflict(format!(
                "username '{username}' is already taken"
            )));
        }
        tables.last_user_id += 1;
        let user = UserCredentials {
            id: tables.last_user_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        let session_user = user.to_session_user();
        tables.users.insert(user.id, user);
        Ok(session_user)
    }
}
