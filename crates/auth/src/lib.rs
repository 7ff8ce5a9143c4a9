//! Accounts and login sessions for the polling-center locator.
//!
//! Passwords are hashed with Argon2id before they reach the database. The
//! [`AuthUser`] and [`UserLoader`] traits give a login-session layer what it
//! needs to track the current user without depending on storage details.

pub mod account;
pub mod hasher;
pub mod session;

pub use account::{authenticate, change_password, register_user, Registration};
pub use hasher::{Argon2Hasher, PasswordHasher};
pub use session::{AnonymousUser, AuthUser, UserLoader};

use votings_db::DbError;

/// Error type for authentication operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Password hashing failed: {0}")]
    Hash(String),
    #[error("Password must not be empty")]
    EmptyPassword,
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
