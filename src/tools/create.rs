/// Tool for creating new habits
///
/// This module implements the habit_create MCP tool.

use serde::Deserialize;
use schemars::JsonSchema;

use crate::auth::Session;
use crate::domain::{Frequency, Habit};
use crate::engine::today;
use crate::storage::HabitStorage;
use crate::tools::{HabitView, ToolError};

/// Parameters for creating a new habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateHabitParams {
    #[schemars(description = "Title of the habit (max 100 characters)")]
    pub title: String,
    #[schemars(description = "Optional description (max 500 characters)")]
    pub description: Option<String>,
    #[schemars(description = "How often: 'daily', 'weekly' or 'monthly' (default: daily)")]
    pub frequency: Option<String>,
    #[schemars(description = "Completions needed per day to meet the goal (default: 1)")]
    pub goal: Option<i64>,
}

/// Create a new habit owned by the session user
pub fn create_habit<S: HabitStorage>(
    storage: &S,
    session: &Session,
    params: CreateHabitParams,
) -> Result<HabitView, ToolError> {
    let frequency = match params.frequency.as_deref() {
        Some(raw) => Frequency::parse(raw)?,
        None => Frequency::default(),
    };

    let habit = Habit::new(
        session.user_id.clone(),
        params.title,
        params.description,
        frequency,
        params.goal.unwrap_or(1),
    )?;

    storage.create_habit(&habit)?;
    tracing::info!("Created habit '{}' ({}) for user {}", habit.title, habit.id, session.user_id);

    Ok(HabitView::new(habit, today()))
}
