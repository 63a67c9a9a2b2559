/// User accounts that own habits

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::{DomainError, UserId};

/// Display name used when a user registers without one
pub const DEFAULT_USER_NAME: &str = "User";

/// A registered account
///
/// `password_hash` never leaves the server; use [`PublicUser`] in responses.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// The user fields that are safe to return to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a user from a validated email and an already hashed password
    pub fn new(name: Option<String>, email: &str, password_hash: String) -> Result<Self, DomainError> {
        let email = normalize_email(email)?;
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_USER_NAME.to_string());

        Ok(Self {
            id: UserId::new(),
            name,
            email,
            password_hash,
            created_at: Utc::now(),
        })
    }

    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

/// Trim and lowercase an email, rejecting obviously malformed input
pub fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();

    if email.is_empty() {
        return Err(DomainError::InvalidEmail("Email is required".to_string()));
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(email)
        }
        _ => Err(DomainError::InvalidEmail(format!("'{}' is not a valid email", email))),
    }
}
