/// MCP tools for accounts and habit management
///
/// Each tool is a plain function taking the storage, the caller's
/// [`Session`] (account tools take the [`AuthService`] instead) and its
/// deserialized parameters. Ownership checks live here; the streak engine
/// never sees who is asking.

pub mod register;
pub mod login;
pub mod me;
pub mod create;
pub mod list;
pub mod get;
pub mod update;
pub mod delete;
pub mod complete;
pub mod streaks;
pub mod calendar;
pub mod insights;

// Re-export tool functions for easy access
pub use register::*;
pub use login::*;
pub use me::*;
pub use create::*;
pub use list::*;
pub use get::*;
pub use update::*;
pub use delete::*;
pub use complete::*;
pub use streaks::*;
pub use calendar::*;
pub use insights::*;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use thiserror::Error;

use crate::auth::{AuthError, Session};
use crate::domain::{DomainError, Habit, HabitId};
use crate::engine::StreakSummary;
use crate::storage::{HabitStorage, StorageError};

/// Errors surfaced to API callers
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    NotAuthorized(String),

    #[error("{0}")]
    AuthenticationFailure(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(StorageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StorageError> for ToolError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::HabitNotFound { .. } => ToolError::NotFound("Habit not found".to_string()),
            StorageError::UserNotFound { .. } => ToolError::NotFound("User not found".to_string()),
            StorageError::DuplicateUser { .. } => ToolError::Conflict("User already exists".to_string()),
            StorageError::Domain(e) => ToolError::Domain(e),
            other => ToolError::Storage(other),
        }
    }
}

impl From<AuthError> for ToolError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::MissingToken | AuthError::InvalidToken(_) | AuthError::InvalidCredentials => {
                ToolError::AuthenticationFailure(error.to_string())
            }
            AuthError::Hashing(_) | AuthError::Issue(_) => ToolError::Internal(error.to_string()),
        }
    }
}

/// Parameters naming a single habit
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct HabitIdParams {
    #[schemars(description = "ID of the habit")]
    pub habit_id: String,
}

/// A habit together with its derived streak figures
#[derive(Debug, Clone, Serialize)]
pub struct HabitView {
    pub habit: Habit,
    pub summary: StreakSummary,
}

impl HabitView {
    pub fn new(habit: Habit, today: NaiveDate) -> Self {
        let summary = StreakSummary::from_habit(&habit, today);
        Self { habit, summary }
    }
}

/// Parse a habit id, treating malformed ids as unknown habits
pub fn parse_habit_id(raw: &str) -> Result<HabitId, ToolError> {
    HabitId::from_string(raw).map_err(|_| ToolError::NotFound("Habit not found".to_string()))
}

/// Load a habit and make sure the session owns it
pub fn load_owned_habit<S: HabitStorage>(
    storage: &S,
    session: &Session,
    habit_id: &HabitId,
) -> Result<Habit, ToolError> {
    let habit = storage.get_habit(habit_id)?;
    ensure_owner(&habit, session)?;
    Ok(habit)
}

fn ensure_owner(habit: &Habit, session: &Session) -> Result<(), ToolError> {
    if habit.is_owned_by(&session.user_id) {
        Ok(())
    } else {
        tracing::warn!("User {} tried to access habit {} it does not own", session.user_id, habit.id);
        Err(ToolError::NotAuthorized("Not authorized".to_string()))
    }
}
