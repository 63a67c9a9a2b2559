/// Authentication: password hashing, bearer tokens and sessions
///
/// Tools never see raw tokens. The server validates the `token` argument
/// into a [`Session`] and hands that to the tool, so every habit operation
/// runs against an explicit authenticated identity.

pub mod jwt;
pub mod password;
pub mod service;

pub use service::AuthService;

use thiserror::Error;
use crate::domain::UserId;

/// Errors raised while authenticating a caller
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authentication required: missing token")]
    MissingToken,

    #[error("Invalid or expired token: {0}")]
    InvalidToken(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("Failed to issue token: {0}")]
    Issue(String),
}

/// The authenticated identity a request runs as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
}

impl Session {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}
