//! Session lifecycle: issuance, validation with sliding renewal, and
//! invalidation.
//!
//! - [`SessionManager`] -- the state machine, driven through injected ports.
//! - [`SessionStore`] -- persistence contract implemented by the db crate and
//!   by [`crate::memory::MemoryStore`].
//! - [`SessionPolicy`] -- lifetime and renewal threshold.

mod manager;
mod policy;
mod store;

pub use manager::SessionManager;
pub use policy::{SessionPolicy, DEFAULT_LIFETIME_DAYS, DEFAULT_RENEWAL_DAYS, MAX_LIFETIME_DAYS};
pub use store::SessionStore;

use serde::Serialize;

use crate::types::{DbId, SessionId, Timestamp};

/// A persisted session row. `id` is the hash of the client's token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub id: SessionId,
    pub user_id: DbId,
    pub expires_at: Timestamp,
}

/// The user fields joined onto a session during validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub id: DbId,
    pub username: String,
}

/// Outcome of a successful [`SessionManager::validate_token`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSession {
    pub session: Session,
    pub user: SessionUser,
    /// Whether `session.expires_at` was pushed forward by this call. The
    /// client cookie must be rewritten when this is set.
    pub renewed: bool,
}
