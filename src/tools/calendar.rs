/// Tool rendering a habit's completion calendar
///
/// This module implements the habit_calendar MCP tool.

use serde::{Deserialize, Serialize};
use schemars::JsonSchema;

use crate::auth::Session;
use crate::domain::HabitId;
use crate::engine::{
    build_calendar, calendar_start, calendar_statistics, group_by_month, month_window, today, CalendarMonth,
    CalendarStatistics, CalendarWindow,
};
use crate::storage::HabitStorage;
use crate::tools::{load_owned_habit, parse_habit_id, ToolError};

/// Most months a single calendar request may span
pub const MAX_CALENDAR_MONTHS: u32 = 12;

/// Parameters for a habit calendar
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CalendarParams {
    #[schemars(description = "ID of the habit")]
    pub habit_id: String,
    #[schemars(description = "Number of months to show (default: 3, max: 12)")]
    pub months: Option<u32>,
    #[schemars(description = "Months back from the current month for the last month shown (default: 0)")]
    pub offset: Option<u32>,
}

/// Response containing a calendar grouped by month
#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub habit_id: HabitId,
    pub title: String,
    pub goal: u32,
    pub window: CalendarWindow,
    pub statistics: CalendarStatistics,
    pub months: Vec<CalendarMonth>,
}

pub fn habit_calendar<S: HabitStorage>(
    storage: &S,
    session: &Session,
    params: CalendarParams,
) -> Result<CalendarResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let habit = load_owned_habit(storage, session, &habit_id)?;

    let months = params.months.unwrap_or(3).clamp(1, MAX_CALENDAR_MONTHS);
    let window = month_window(today(), months, params.offset.unwrap_or(0), calendar_start(&habit));
    let days = build_calendar(&habit.completions, habit.goal, window.start, window.end);

    Ok(CalendarResponse {
        habit_id: habit.id,
        title: habit.title,
        goal: habit.goal,
        window,
        statistics: calendar_statistics(&days),
        months: group_by_month(&days),
    })
}
