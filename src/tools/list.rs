/// Tool for listing all habits
///
/// This module implements the habit_list MCP tool.

use serde::Serialize;

use crate::auth::Session;
use crate::engine::{summarize_habits, today, HabitsSummary};
use crate::storage::HabitStorage;
use crate::tools::{HabitView, ToolError};

/// Response from listing habits
#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub habits: Vec<HabitView>,
    pub summary: HabitsSummary,
}

/// List the session user's habits, newest first
pub fn list_habits<S: HabitStorage>(storage: &S, session: &Session) -> Result<ListHabitsResponse, ToolError> {
    let habits = storage.list_habits(&session.user_id)?;
    let summary = summarize_habits(&habits);
    let today = today();

    Ok(ListHabitsResponse {
        habits: habits.into_iter().map(|habit| HabitView::new(habit, today)).collect(),
        summary,
    })
}
