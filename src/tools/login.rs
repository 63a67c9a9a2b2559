/// Tool for logging in
///
/// This module implements the user_login MCP tool.

use serde::Deserialize;
use schemars::JsonSchema;

use crate::auth::{AuthError, AuthService};
use crate::domain::normalize_email;
use crate::storage::{HabitStorage, StorageError};
use crate::tools::{AuthResponse, ToolError};

/// Parameters for logging in
#[derive(Debug, Deserialize, JsonSchema)]
pub struct LoginParams {
    #[schemars(description = "Email address")]
    pub email: String,
    #[schemars(description = "Password")]
    pub password: String,
}

/// Check credentials and issue a token
///
/// An unknown email and a wrong password fail the same way.
pub fn login_user<S: HabitStorage>(
    storage: &S,
    auth: &AuthService,
    params: LoginParams,
) -> Result<AuthResponse, ToolError> {
    let email = normalize_email(&params.email).map_err(|_| AuthError::InvalidCredentials)?;

    let user = match storage.get_user_by_email(&email) {
        Ok(user) => user,
        Err(StorageError::UserNotFound { .. }) => {
            tracing::warn!("Login attempt for unknown email");
            return Err(AuthError::InvalidCredentials.into());
        }
        Err(e) => return Err(e.into()),
    };

    if !auth.verify_password(&params.password, &user.password_hash)? {
        tracing::warn!("Failed login for user {}", user.id);
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = auth.issue_token(&user.id)?;
    tracing::debug!("User {} logged in", user.id);

    Ok(AuthResponse {
        user: user.public(),
        token,
    })
}
