//! Request middleware and extractors.
//!
//! - [`auth::authenticate`] -- Resolves the session cookie into an [`auth::AuthState`].
//! - [`auth::AuthUser`] -- Requires an authenticated session (401 otherwise).
//! - [`auth::MaybeAuthUser`] -- Optional session.
//! - [`origin::check_origin`] -- Rejects cross-origin state-changing requests.

pub mod auth;
pub mod origin;
