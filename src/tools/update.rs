/// Tool for updating existing habits
///
/// This module implements the habit_update MCP tool to modify
/// existing habit properties like title, frequency and goal.

use serde::Deserialize;
use schemars::JsonSchema;

use crate::auth::Session;
use crate::domain::{Frequency, Habit};
use crate::engine::{refresh_streak, today};
use crate::storage::{HabitStorage, StorageError};
use crate::tools::{load_owned_habit, parse_habit_id, HabitView, ToolError};

/// Parameters for updating an existing habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateHabitParams {
    #[schemars(description = "ID of the habit to update")]
    pub habit_id: String,
    #[schemars(description = "New title")]
    pub title: Option<String>,
    #[schemars(description = "New description; an empty string clears it")]
    pub description: Option<String>,
    #[schemars(description = "New frequency: 'daily', 'weekly' or 'monthly'")]
    pub frequency: Option<String>,
    #[schemars(description = "New daily goal; lowering it clamps recorded counts")]
    pub goal: Option<i64>,
}

/// Update an existing habit using the provided storage
///
/// The change and the cached streak refresh are written in one atomic step.
pub fn update_habit<S: HabitStorage>(
    storage: &S,
    session: &Session,
    params: UpdateHabitParams,
) -> Result<HabitView, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    // Owners never change, so checking before the atomic update is enough
    load_owned_habit(storage, session, &habit_id)?;

    let frequency = params.frequency.as_deref().map(Frequency::parse).transpose()?;
    let description = params
        .description
        .map(|desc| Some(desc.trim().to_string()).filter(|d| !d.is_empty()));
    let today = today();

    let mut apply = |habit: &mut Habit| -> Result<(), StorageError> {
        habit.update(params.title.clone(), description.clone(), frequency, params.goal)?;
        refresh_streak(habit, today);
        Ok(())
    };
    let habit = storage.modify_habit(&habit_id, &mut apply)?;

    tracing::info!("Updated habit '{}' ({})", habit.title, habit.id);
    Ok(HabitView::new(habit, today))
}
