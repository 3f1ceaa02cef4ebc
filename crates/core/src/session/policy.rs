use chrono::Duration;

use crate::error::CoreError;

/// Default absolute session lifetime.
pub const DEFAULT_LIFETIME_DAYS: i64 = 30;

/// Default renewal window: a session is extended once it has this much (or
/// less) time left.
pub const DEFAULT_RENEWAL_DAYS: i64 = 15;

/// Longest accepted session lifetime.
pub const MAX_LIFETIME_DAYS: i64 = 3650;

/// Timing rules for session expiry and sliding renewal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    lifetime: Duration,
    renewal_threshold: Duration,
}

impl SessionPolicy {
    /// Build a policy. The renewal threshold must be positive and shorter
    /// than the lifetime, otherwise every validation would renew.
    pub fn new(lifetime: Duration, renewal_threshold: Duration) -> Result<Self, CoreError> {
        if lifetime <= Duration::zero() {
            return Err(CoreError::Validation(
                "Session lifetime must be positive".into(),
            ));
        }
        if lifetime > Duration::days(MAX_LIFETIME_DAYS) {
            return Err(CoreError::Validation(format!(
                "Session lifetime must not exceed {MAX_LIFETIME_DAYS} days"
            )));
        }
        if renewal_threshold <= Duration::zero() || renewal_threshold >= lifetime {
            return Err(CoreError::Validation(format!(
                "Session renewal threshold must be between 0 and the lifetime ({} days)",
                lifetime.num_days()
            )));
        }
        Ok(Self {
            lifetime,
            renewal_threshold,
        })
    }

    /// Convenience constructor from whole days.
    pub fn from_days(lifetime_days: i64, renewal_days: i64) -> Result<Self, CoreError> {
        let days = |n: i64| {
            Duration::try_days(n).ok_or_else(|| {
                CoreError::Validation(format!("{n} days is out of range for a session duration"))
            })
        };
        Self::new(days(lifetime_days)?, days(renewal_days)?)
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn renewal_threshold(&self) -> Duration {
        self.renewal_threshold
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            lifetime: Duration::days(DEFAULT_LIFETIME_DAYS),
            renewal_threshold: Duration::days(DEFAULT_RENEWAL_DAYS),
        }
    }
}
