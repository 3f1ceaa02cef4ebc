//! Periodic removal of expired sessions.
//!
//! Expired rows are already deleted lazily when their token is presented.
//! This job catches sessions that are never presented again so the table
//! does not grow without bound. Runs on a fixed interval using
//! `tokio::time::interval`.

use std::sync::Arc;
use std::time::Duration;

use gatehouse_core::session::SessionManager;
use tokio_util::sync::CancellationToken;

/// Run the expired-session sweep loop until `cancel` is triggered.
///
/// The first sweep happens immediately on start.
pub async fn run(sessions: Arc<SessionManager>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Session sweep job started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session sweep job stopping");
                break;
            }
            _ = ticker.tick() => {
                match sessions.purge_expired().await {
                    Ok(deleted) => {
                        if deleted > 0 {
                            tracing::info!(deleted, "Session sweep: purged expired sessions");
                        } else {
                            tracing::debug!("Session sweep: nothing to purge");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Session sweep: cleanup failed");
                    }
                }
            }
        }
    }
}
