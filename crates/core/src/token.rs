//! Session token generation and token-to-id derivation.
//!
//! A token is 20 bytes from the thread-local CSPRNG, encoded as unpadded
//! base64url so it can be placed in a cookie without escaping. Only the
//! SHA-256 digest of the encoded token is ever persisted (see [`session_id_for`]).

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

use crate::hashing::sha256_hex;
use crate::types::SessionId;

/// Number of random bytes in a session token.
pub const TOKEN_BYTES: usize = 20;

/// A raw session token. Held by the client; never stored or logged.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a token string received from a client.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The encoded token, for placing in the `auth-session` cookie.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The session id this token maps to.
    pub fn session_id(&self) -> SessionId {
        session_id_for(&self.0)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Generate a fresh, unpredictable session token.
pub fn generate_session_token() -> SessionToken {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    SessionToken(URL_SAFE_NO_PAD.encode(bytes))
}

/// Derive the session id (lowercase hex SHA-256) from an encoded token.
pub fn session_id_for(token: &str) -> SessionId {
    sha256_hex(token.as_bytes())
}
