use std::fmt;
use std::str::FromStr;

use gatehouse_core::error::CoreError;
use gatehouse_core::session::{SessionPolicy, DEFAULT_LIFETIME_DAYS, DEFAULT_RENEWAL_DAYS};

/// Deployment environment. Drives defaults such as the cookie `Secure` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testing,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "testing" | "test" => Ok(Self::Testing),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!(
                "unknown environment '{other}' (expected development, testing or production)"
            )),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Production => "production",
        };
        f.write_str(name)
    }
}

/// Session lifetime, cookie and revocation settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Absolute session lifetime in days (default: `30`).
    pub lifetime_days: i64,
    /// Remaining lifetime, in days, at or below which a session is renewed (default: `15`).
    pub renewal_days: i64,
    /// Whether session cookies carry the `Secure` attribute.
    pub cookie_secure: bool,
    /// Interval of the expired-session sweep in seconds; `0` disables it.
    pub sweep_interval_secs: u64,
    /// Endpoint told about "log out everywhere" events, if any.
    pub revocation_notify_url: Option<String>,
    /// Upper bound on a single revocation notification, in seconds.
    pub revocation_notify_timeout_secs: u64,
}

impl SessionConfig {
    /// Build the core session policy from the configured day counts.
    pub fn policy(&self) -> Result<SessionPolicy, CoreError> {
        SessionPolicy::from_days(self.lifetime_days, self.renewal_days)
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Deployment environment (default: `development`).
    pub environment: Environment,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// The only `Origin` accepted on state-changing requests.
    pub allowed_origin: String,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Session lifecycle settings.
    pub session: SessionConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                         |
    /// |----------------------------------|---------------------------------|
    /// | `HOST`                           | `0.0.0.0`                       |
    /// | `PORT`                           | `3000`                          |
    /// | `APP_ENV`                        | `development`                   |
    /// | `CORS_ORIGINS`                   | `http://localhost:5173`         |
    /// | `ALLOWED_ORIGIN`                 | `http://localhost:5173`         |
    /// | `REQUEST_TIMEOUT_SECS`           | `30`                            |
    /// | `COOKIE_SECURE`                  | `true` in production, else `false` |
    /// | `SESSION_LIFETIME_DAYS`          | `30`                            |
    /// | `SESSION_RENEWAL_DAYS`           | `15`                            |
    /// | `SESSION_SWEEP_INTERVAL_SECS`    | `3600`                          |
    /// | `REVOCATION_NOTIFY_URL`          | unset                           |
    /// | `REVOCATION_NOTIFY_TIMEOUT_SECS` | `5`                             |
    ///
    /// # Panics
    ///
    /// Panics if any variable is present but malformed, or if the session
    /// lifetime/renewal pair is inconsistent.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = var("HOST", "0.0.0.0");
        let port: u16 = parse_or_panic("PORT", &var("PORT", "3000"));

        let environment: Environment =
            parse_or_panic("APP_ENV", &var("APP_ENV", "development"));

        let cors_origins: Vec<String> = var("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let allowed_origin = var("ALLOWED_ORIGIN", "http://localhost:5173");

        let request_timeout_secs: u64 =
            parse_or_panic("REQUEST_TIMEOUT_SECS", &var("REQUEST_TIMEOUT_SECS", "30"));

        let cookie_secure = match lookup("COOKIE_SECURE") {
            Some(raw) => parse_bool("COOKIE_SECURE", &raw),
            None => environment == Environment::Production,
        };

        let session = SessionConfig {
            lifetime_days: parse_or_panic(
                "SESSION_LIFETIME_DAYS",
                &var("SESSION_LIFETIME_DAYS", &DEFAULT_LIFETIME_DAYS.to_string()),
            ),
            renewal_days: parse_or_panic(
                "SESSION_RENEWAL_DAYS",
                &var("SESSION_RENEWAL_DAYS", &DEFAULT_RENEWAL_DAYS.to_string()),
            ),
            cookie_secure,
            sweep_interval_secs: parse_or_panic(
                "SESSION_SWEEP_INTERVAL_SECS",
                &var("SESSION_SWEEP_INTERVAL_SECS", "3600"),
            ),
            revocation_notify_url: lookup("REVOCATION_NOTIFY_URL").filter(|s| !s.trim().is_empty()),
            revocation_notify_timeout_secs: parse_or_panic(
                "REVOCATION_NOTIFY_TIMEOUT_SECS",
                &var("REVOCATION_NOTIFY_TIMEOUT_SECS", "5"),
            ),
        };

        if let Err(e) = session.policy() {
            panic!("Invalid session configuration: {e}");
        }

        if environment == Environment::Production && !session.cookie_secure {
            tracing::warn!("COOKIE_SECURE is disabled in production");
        }

        Self {
            host,
            port,
            environment,
            cors_origins,
            allowed_origin,
            request_timeout_secs,
            session,
        }
    }
}

fn parse_or_panic<T>(key: &str, raw: &str) -> T
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim()
        .parse()
        .unwrap_or_else(|e| panic!("{key} has invalid value '{raw}': {e}"))
}

fn parse_bool(key: &str, raw: &str) -> bool {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => panic!("{key} must be a boolean, got '{raw}'"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> ServerConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.allowed_origin, "http://localhost:5173");
        assert_eq!(config.session.lifetime_days, 30);
        assert_eq!(config.session.renewal_days, 15);
        assert!(!config.session.cookie_secure);
        assert_eq!(config.session.revocation_notify_url, None);
    }

    #[test]
    fn production_defaults_to_secure_cookies() {
        let config = load(&[("APP_ENV", "production")]);
        assert!(config.session.cookie_secure);

        let config = load(&[("APP_ENV", "production"), ("COOKIE_SECURE", "false")]);
        assert!(!config.session.cookie_secure);
    }

    #[test]
    fn session_policy_is_configurable() {
        let config = load(&[
            ("SESSION_LIFETIME_DAYS", "14"),
            ("SESSION_RENEWAL_DAYS", "7"),
        ]);
        let policy = config.session.policy().unwrap();
        assert_eq!(policy.lifetime(), chrono::Duration::days(14));
        assert_eq!(policy.renewal_threshold(), chrono::Duration::days(7));
    }

    #[test]
    #[should_panic(expected = "Invalid session configuration")]
    fn inconsistent_policy_panics() {
        load(&[("SESSION_LIFETIME_DAYS", "10"), ("SESSION_RENEWAL_DAYS", "10")]);
    }

    #[test]
    #[should_panic(expected = "Invalid session configuration")]
    fn oversized_lifetime_panics() {
        load(&[("SESSION_LIFETIME_DAYS", "200000000")]);
    }

    #[test]
    #[should_panic(expected = "PORT has invalid value")]
    fn malformed_port_panics() {
        load(&[("PORT", "not-a-port")]);
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let config = load(&[("CORS_ORIGINS", "https://a.example, https://b.example,")]);
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn environment_parses_aliases() {
        assert_eq!("prod".parse::<Environment>(), Ok(Environment::Production));
        assert_eq!("Testing".parse::<Environment>(), Ok(Environment::Testing));
        assert!("staging".parse::<Environment>().is_err());
    }
}
