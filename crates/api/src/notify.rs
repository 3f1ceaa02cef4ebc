//! HTTP delivery of "all sessions revoked" events.
//!
//! [`HttpRevocationNotifier`] POSTs `{"user_id": <id>}` to a configured URL
//! whenever a user logs out everywhere, so other services holding derived
//! credentials can drop them too. Delivery is a single attempt; the session
//! manager bounds it with its own timeout and only logs failures.

use std::time::Duration;

use async_trait::async_trait;
use gatehouse_core::notify::{NotifyError, RevocationNotifier};
use gatehouse_core::types::DbId;

/// Sends revocation events to an external endpoint.
pub struct HttpRevocationNotifier {
    client: reqwest::Client,
    url: String,
}

impl HttpRevocationNotifier {
    /// Create a notifier posting to `url`, with `timeout` per request.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RevocationNotifier for HttpRevocationNotifier {
    async fn user_sessions_revoked(&self, user_id: DbId) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "user_id": user_id }))
            .send()
            .await
            .map_err(|e| NotifyError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(user_id, url = %self.url, "Revocation event delivered");
            Ok(())
        } else {
            Err(NotifyError::HttpStatus(status.as_u16()))
        }
    }
}
