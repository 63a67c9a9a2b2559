/// Tool summarizing the caller's running streaks
///
/// This module implements the habit_streaks MCP tool.

use serde::Serialize;

use crate::auth::Session;
use crate::domain::HabitId;
use crate::engine::{today, StreakSummary};
use crate::storage::HabitStorage;
use crate::tools::ToolError;

/// One habit with a running streak
#[derive(Debug, Serialize)]
pub struct StreakEntry {
    pub habit_id: HabitId,
    pub title: String,
    pub goal: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Response listing running streaks
#[derive(Debug, Serialize)]
pub struct StreaksResponse {
    /// Habits with a current streak, longest running first
    pub streaks: Vec<StreakEntry>,
    /// Best run across all habits
    pub longest_streak: u32,
}

pub fn habit_streaks<S: HabitStorage>(storage: &S, session: &Session) -> Result<StreaksResponse, ToolError> {
    let today = today();
    let habits = storage.list_habits(&session.user_id)?;

    let summaries: Vec<(String, u32, StreakSummary)> = habits
        .into_iter()
        .map(|habit| {
            let summary = StreakSummary::from_habit(&habit, today);
            (habit.title, habit.goal, summary)
        })
        .collect();

    let longest_streak = summaries
        .iter()
        .map(|(_, _, summary)| summary.longest_streak)
        .max()
        .unwrap_or(0);

    let mut streaks: Vec<StreakEntry> = summaries
        .into_iter()
        .filter(|(_, _, summary)| summary.current_streak > 0)
        .map(|(title, goal, summary)| StreakEntry {
            habit_id: summary.habit_id,
            title,
            goal,
            current_streak: summary.current_streak,
            longest_streak: summary.longest_streak,
        })
        .collect();
    streaks.sort_by(|a, b| b.current_streak.cmp(&a.current_streak));

    Ok(StreaksResponse {
        streaks,
        longest_streak,
    })
}
