/// Tool for providing habit insights and recommendations
///
/// This module implements the habit_insights MCP tool that analyzes
/// progress trends across the caller's habits.

use serde::Deserialize;
use schemars::JsonSchema;

use crate::analytics::{AnalyticsEngine, InsightsReport};
use crate::auth::Session;
use crate::engine::{today, TimeFrame};
use crate::storage::HabitStorage;
use crate::tools::{load_owned_habit, parse_habit_id, ToolError};

/// Parameters for habit insights
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct InsightsParams {
    #[schemars(description = "Analysis window: 'week', 'month', 'year' or 'all' (default: all)")]
    pub time_frame: Option<String>,
    #[schemars(description = "ID of a specific habit (optional - analyzes all habits if omitted)")]
    pub habit_id: Option<String>,
}

/// Analyze habits and generate insights
pub fn habit_insights<S: HabitStorage>(
    storage: &S,
    session: &Session,
    params: InsightsParams,
) -> Result<InsightsReport, ToolError> {
    let time_frame = match params.time_frame.as_deref() {
        Some(raw) => TimeFrame::parse(raw)?,
        None => TimeFrame::default(),
    };

    let habits = match params.habit_id.as_deref() {
        Some(raw) => {
            let habit_id = parse_habit_id(raw)?;
            vec![load_owned_habit(storage, session, &habit_id)?]
        }
        None => storage.list_habits(&session.user_id)?,
    };

    Ok(AnalyticsEngine::new().build_report(&habits, time_frame, today()))
}
