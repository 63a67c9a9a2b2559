/// Tool for recording habit completions
///
/// This module implements the habit_complete MCP tool.

use serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use chrono::NaiveDate;

use crate::auth::Session;
use crate::domain::{find_record, validate_submission_day, DomainError, Habit};
use crate::engine::{parse_day, percentage, record_completion, refresh_streak, today, CountUpdate};
use crate::storage::{HabitStorage, StorageError};
use crate::tools::{load_owned_habit, parse_habit_id, HabitView, ToolError};

/// Parameters for recording a completion
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CompleteHabitParams {
    #[schemars(description = "ID of the habit")]
    pub habit_id: String,
    #[schemars(description = "Completions for the day, replacing the stored count (default: 1)")]
    pub count: Option<i64>,
    #[schemars(description = "Completions to add to the day's stored count")]
    pub increment: Option<i64>,
    #[schemars(description = "Day to record (YYYY-MM-DD or RFC 3339, default: today UTC)")]
    pub date: Option<String>,
}

/// Response from recording a completion
#[derive(Debug, Serialize)]
pub struct CompleteHabitResponse {
    pub day: NaiveDate,
    pub count: u32,
    pub met: bool,
    pub progress: u8,
    pub message: String,
    #[serde(flatten)]
    pub view: HabitView,
}

/// Record completions for a day and refresh the cached streak atomically
pub fn complete_habit<S: HabitStorage>(
    storage: &S,
    session: &Session,
    params: CompleteHabitParams,
) -> Result<CompleteHabitResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    load_owned_habit(storage, session, &habit_id)?;

    let update = count_update(params.count, params.increment)?;
    let today = today();
    let day = match params.date.as_deref() {
        Some(raw) => parse_day(raw)?,
        None => today,
    };
    validate_submission_day(day, today)?;

    let mut apply = |habit: &mut Habit| -> Result<(), StorageError> {
        *habit = record_completion(habit, day, update);
        refresh_streak(habit, today);
        Ok(())
    };
    let habit = storage.modify_habit(&habit_id, &mut apply)?;

    let count = find_record(&habit.completions, day).map_or(0, |record| record.count);
    let met = count >= habit.goal;
    let progress = percentage(count, habit.goal);
    let message = if met {
        format!(
            "Goal met for {}! Current streak: {} day{}",
            day,
            habit.streak,
            if habit.streak == 1 { "" } else { "s" }
        )
    } else {
        format!("Logged {}/{} for {} ({}%)", count, habit.goal, day, progress)
    };

    tracing::debug!("Recorded {}/{} for habit {} on {}", count, habit.goal, habit.id, day);

    Ok(CompleteHabitResponse {
        day,
        count,
        met,
        progress,
        message,
        view: HabitView::new(habit, today),
    })
}

fn count_update(count: Option<i64>, increment: Option<i64>) -> Result<CountUpdate, DomainError> {
    let non_negative = |value: i64, name: &str| -> Result<u32, DomainError> {
        if value < 0 {
            return Err(DomainError::Validation {
                message: format!("{} cannot be negative", name),
            });
        }
        Ok(u32::try_from(value).unwrap_or(u32::MAX))
    };

    match (count, increment) {
        (Some(_), Some(_)) => Err(DomainError::Validation {
            message: "Provide either count or increment, not both".to_string(),
        }),
        (Some(count), None) => Ok(CountUpdate::Set(non_negative(count, "count")?)),
        (None, Some(increment)) => Ok(CountUpdate::Add(non_negative(increment, "increment")?)),
        (None, None) => Ok(CountUpdate::Set(1)),
    }
}
