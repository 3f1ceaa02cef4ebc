use std::sync::Arc;
use std::time::Duration;

use chrono::SubsecRound;

use super::store::id_prefix;
use super::{Session, SessionPolicy, SessionStore, ValidatedSession};
use crate::clock::{Clock, SystemClock};
use crate::error::StoreError;
use crate::notify::RevocationNotifier;
use crate::token::{generate_session_token, session_id_for, SessionToken};
use crate::types::{DbId, Timestamp};

/// Default upper bound on a revocation notification.
const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Issues, validates, renews and invalidates sessions.
///
/// All state lives in the injected [`SessionStore`]; the manager itself is
/// immutable and cheap to share behind an `Arc`.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    policy: SessionPolicy,
    notifier: Option<Arc<dyn RevocationNotifier>>,
    notify_timeout: Duration,
}

impl SessionManager {
    /// Create a manager over `store` using wall-clock time.
    pub fn new(store: Arc<dyn SessionStore>, policy: SessionPolicy) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            policy,
            notifier: None,
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Notify `notifier` whenever all sessions of a user are invalidated.
    /// Each notification is abandoned after `timeout`.
    pub fn with_notifier(mut self, notifier: Arc<dyn RevocationNotifier>, timeout: Duration) -> Self {
        self.notifier = Some(notifier);
        self.notify_timeout = timeout;
        self
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    /// Produce a new random token. Nothing is persisted.
    pub fn generate_token(&self) -> SessionToken {
        generate_session_token()
    }

    /// Persist a session for `token` expiring one lifetime from now.
    ///
    /// The cookie must only be set once this returns `Ok`.
    pub async fn create_session(
        &self,
        token: &SessionToken,
        user_id: DbId,
    ) -> Result<Session, StoreError> {
        let session = Session {
            id: token.session_id(),
            user_id,
            expires_at: self.expiry_from(self.clock.now()),
        };

        if let Err(e) = self.store.insert(&session).await {
            tracing::error!(user_id, error = %e, "Failed to create session");
            return Err(e);
        }

        tracing::info!(
            user_id,
            session = id_prefix(&session.id),
            expires_at = %session.expires_at,
            "Session created"
        );
        Ok(session)
    }

    /// Resolve a client token to its session and user.
    ///
    /// Returns `Ok(None)` for unknown and expired tokens; expired rows are
    /// deleted on the way out. A session inside the renewal window is
    /// extended to one full lifetime from now before it is returned.
    pub async fn validate_token(
        &self,
        token: &str,
    ) -> Result<Option<ValidatedSession>, StoreError> {
        let session_id = session_id_for(token);

        let Some((mut session, user)) = self.store.select_by_hashed_id(&session_id).await? else {
            return Ok(None);
        };

        let now = self.clock.now();

        if now >= session.expires_at {
            self.store.delete_by_id(&session.id).await?;
            tracing::debug!(
                user_id = session.user_id,
                session = id_prefix(&session.id),
                "Expired session removed"
            );
            return Ok(None);
        }

        let mut renewed = false;
        if now >= session.expires_at - self.policy.renewal_threshold() {
            let proposed = self.expiry_from(now);
            match self.store.update_expiry(&session.id, proposed).await? {
                Some(stored) => {
                    session.expires_at = stored;
                    renewed = true;
                    tracing::debug!(
                        user_id = session.user_id,
                        session = id_prefix(&session.id),
                        expires_at = %stored,
                        "Session renewed"
                    );
                }
                // Deleted concurrently (logout raced this request).
                None => return Ok(None),
            }
        }

        Ok(Some(ValidatedSession {
            session,
            user,
            renewed,
        }))
    }

    /// Delete a single session. Missing rows are not an error.
    pub async fn invalidate_session(&self, session_id: &str) -> Result<(), StoreError> {
        let removed = self.store.delete_by_id(session_id).await?;
        tracing::info!(session = id_prefix(session_id), removed, "Session invalidated");
        Ok(())
    }

    /// Delete every session of `user_id`, then notify other services on a
    /// best-effort basis. Returns the number of sessions removed.
    pub async fn invalidate_all_sessions(&self, user_id: DbId) -> Result<u64, StoreError> {
        let removed = self.store.delete_by_user_id(user_id).await?;
        tracing::info!(user_id, removed, "All sessions invalidated");

        if let Some(notifier) = &self.notifier {
            self.notify_revoked(notifier.as_ref(), user_id).await;
        }

        Ok(removed)
    }

    /// Delete every expired session. Used by the periodic sweep.
    pub async fn purge_expired(&self) -> Result<u64, StoreError> {
        self.store.delete_expired(self.clock.now()).await
    }

    /// Probe the backing store.
    pub async fn health_check(&self) -> Result<(), StoreError> {
        self.store.health_check().await
    }

    /// One lifetime after `now`, at the microsecond precision stores keep.
    fn expiry_from(&self, now: Timestamp) -> Timestamp {
        (now + self.policy.lifetime()).trunc_subsecs(6)
    }

    async fn notify_revoked(&self, notifier: &dyn RevocationNotifier, user_id: DbId) {
        match tokio::time::timeout(self.notify_timeout, notifier.user_sessions_revoked(user_id))
            .await
        {
            Ok(Ok(())) => {
                tracing::debug!(user_id, "Revocation notification delivered");
            }
            Ok(Err(e)) => {
                tracing::warn!(user_id, error = %e, "Revocation notification failed");
            }
            Err(_) => {
                tracing::warn!(
                    user_id,
                    timeout_ms = self.notify_timeout.as_millis() as u64,
                    "Revocation notification timed out"
                );
            }
        }
    }
}
