/// User primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Lowercase hex SHA-256 digest of a session token. Primary key of `sessions`.
pub type SessionId = String;
