//! Domain core for the gatehouse authentication service.
//!
//! Holds the session lifecycle ([`session::SessionManager`]) and the ports it
//! is driven through: [`session::SessionStore`], [`user::UserStore`],
//! [`clock::Clock`] and [`notify::RevocationNotifier`]. Nothing here touches
//! the network or a database directly.

pub mod clock;
pub mod error;
pub mod hashing;
pub mod memory;
pub mod notify;
pub mod session;
pub mod token;
pub mod types;
pub mod user;
