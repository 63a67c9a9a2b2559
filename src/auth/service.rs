/// Configured authentication service

use crate::auth::{jwt, password, AuthError, Session};
use crate::domain::UserId;

/// Issues and validates tokens, hashes and verifies passwords
#[derive(Clone)]
pub struct AuthService {
    secret: Vec<u8>,
    token_ttl_days: i64,
    bcrypt_cost: u32,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("token_ttl_days", &self.token_ttl_days)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(secret: impl Into<Vec<u8>>, token_ttl_days: i64, bcrypt_cost: u32) -> Self {
        Self {
            secret: secret.into(),
            token_ttl_days,
            bcrypt_cost,
        }
    }

    pub fn issue_token(&self, user_id: &UserId) -> Result<String, AuthError> {
        jwt::create_token(user_id, &self.secret, self.token_ttl_days)
    }

    /// Validate a bearer token and return the user id it was issued for
    ///
    /// Accepts the raw token or an `Authorization` style `Bearer <token>`.
    pub fn validate_token(&self, token: &str) -> Result<UserId, AuthError> {
        let token = strip_bearer(token);
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let claims = jwt::verify_token(token, &self.secret)?;
        UserId::from_string(&claims.sub)
            .map_err(|_| AuthError::InvalidToken("Token subject is not a user id".to_string()))
    }

    /// Validate a token into a session
    pub fn authenticate(&self, token: Option<&str>) -> Result<Session, AuthError> {
        let token = token.ok_or(AuthError::MissingToken)?;
        let user_id = self.validate_token(token).map_err(|e| {
            tracing::warn!("Rejected token: {}", e);
            e
        })?;
        Ok(Session::new(user_id))
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        password::hash_password(password, self.bcrypt_cost)
    }

    pub fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool, AuthError> {
        password::verify_password(password, password_hash)
    }
}

fn strip_bearer(token: &str) -> &str {
    let token = token.trim();
    match token.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => token[7..].trim(),
        _ => token,
    }
}
