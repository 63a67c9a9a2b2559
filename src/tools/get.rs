/// Tool for fetching one habit
///
/// This module implements the habit_get MCP tool.

use crate::auth::Session;
use crate::engine::today;
use crate::storage::HabitStorage;
use crate::tools::{load_owned_habit, parse_habit_id, HabitIdParams, HabitView, ToolError};

pub fn get_habit<S: HabitStorage>(
    storage: &S,
    session: &Session,
    params: HabitIdParams,
) -> Result<HabitView, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let habit = load_owned_habit(storage, session, &habit_id)?;
    Ok(HabitView::new(habit, today()))
}
