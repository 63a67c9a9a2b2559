/// Tool for registering a new account
///
/// This module implements the user_register MCP tool.

use serde::{Deserialize, Serialize};
use schemars::JsonSchema;

use crate::auth::AuthService;
use crate::domain::{normalize_email, DomainError, PublicUser, User};
use crate::storage::{HabitStorage, StorageError};
use crate::tools::ToolError;

/// Parameters for registering a user
#[derive(Debug, Deserialize, JsonSchema)]
pub struct RegisterParams {
    #[schemars(description = "Display name (defaults to 'User')")]
    pub name: Option<String>,
    #[schemars(description = "Email address, used to log in")]
    pub email: String,
    #[schemars(description = "Password")]
    pub password: String,
}

/// Response from registering or logging in
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
}

/// Create an account and issue its first token
pub fn register_user<S: HabitStorage>(
    storage: &S,
    auth: &AuthService,
    params: RegisterParams,
) -> Result<AuthResponse, ToolError> {
    let email = normalize_email(&params.email)?;
    if params.password.is_empty() {
        return Err(DomainError::Validation {
            message: "Password is required".to_string(),
        }
        .into());
    }

    match storage.get_user_by_email(&email) {
        Ok(_) => return Err(ToolError::Conflict("User already exists".to_string())),
        Err(StorageError::UserNotFound { .. }) => {}
        Err(e) => return Err(e.into()),
    }

    let password_hash = auth.hash_password(&params.password)?;
    let user = User::new(params.name, &email, password_hash)?;
    storage.create_user(&user)?;

    let token = auth.issue_token(&user.id)?;
    tracing::info!("Registered user {}", user.id);

    Ok(AuthResponse {
        user: user.public(),
        token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DEFAULT_USER_NAME;
    use crate::storage::SqliteStorage;
    use crate::tools::test_support::auth;

    fn params(email: &str) -> RegisterParams {
        RegisterParams {
            name: None,
            email: email.to_string(),
            password: "correct horse".to_string(),
        }
    }

    #[test]
    fn test_register_defaults_name_and_issues_token() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let auth = auth();

        let response = register_user(&storage, &auth, params("  New@Example.com ")).unwrap();

        assert_eq!(response.user.name, DEFAULT_USER_NAME);
        assert_eq!(response.user.email, "new@example.com");
        assert_eq!(auth.validate_token(&response.token).unwrap(), response.user.id);

        let stored = storage.get_user(&response.user.id).unwrap();
        assert_ne!(stored.password_hash, "correct horse");
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let auth = auth();
        register_user(&storage, &auth, params("dup@example.com")).unwrap();

        let err = register_user(&storage, &auth, params("DUP@example.com")).unwrap_err();
        assert!(matches!(err, ToolError::Conflict(_)));
        assert_eq!(err.to_string(), "User already exists");
    }

    #[test]
    fn test_requires_password_and_valid_email() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let auth = auth();

        let mut no_password = params("a@example.com");
        no_password.password.clear();
        assert!(matches!(
            register_user(&storage, &auth, no_password),
            Err(ToolError::Domain(DomainError::Validation { .. }))
        ));
        assert!(matches!(
            register_user(&storage, &auth, params("not-an-email")),
            Err(ToolError::Domain(DomainError::InvalidEmail(_)))
        ));
    }
}
