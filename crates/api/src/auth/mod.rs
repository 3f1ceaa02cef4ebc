//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`cookie`] -- the `auth-session` cookie.

pub mod cookie;
pub mod password;
