/// Tool for deleting habits
///
/// This module implements the habit_delete MCP tool.

use serde::Serialize;

use crate::auth::Session;
use crate::storage::HabitStorage;
use crate::tools::{load_owned_habit, parse_habit_id, HabitIdParams, ToolError};

/// Response from deleting a habit
#[derive(Debug, Serialize)]
pub struct DeleteHabitResponse {
    pub habit_id: String,
    pub message: String,
}

/// Delete a habit and all of its completion records
pub fn delete_habit<S: HabitStorage>(
    storage: &S,
    session: &Session,
    params: HabitIdParams,
) -> Result<DeleteHabitResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let habit = load_owned_habit(storage, session, &habit_id)?;

    storage.delete_habit(&habit_id)?;
    tracing::info!("Deleted habit '{}' ({})", habit.title, habit_id);

    Ok(DeleteHabitResponse {
        habit_id: habit_id.to_string(),
        message: format!("Deleted habit '{}'", habit.title),
    })
}
