/// Analytics engine for generating insights and recommendations
///
/// This module turns a user's habits into an insight report. Every figure
/// comes from the streak engine; this layer only selects the time frame,
/// assembles per-habit results and writes the highlight messages.

use serde::Serialize;
use chrono::NaiveDate;

use crate::domain::{Habit, HabitId};
use crate::engine::{
    compute_current_streak, compute_daily_progress, compute_series_statistics, performance_message,
    progress_series, summarize_habits, HabitsSummary, ProgressStatus, SeriesStatistics, TimeFrame,
    TrendDirection,
};

/// Insight for one habit over the selected time frame
#[derive(Debug, Clone, Serialize)]
pub struct HabitInsight {
    pub habit_id: HabitId,
    pub title: String,
    pub current_streak: u32,
    /// Label for today's progress
    pub today_status: String,
    /// `None` when the habit has no recorded days in the time frame
    pub statistics: Option<SeriesStatistics>,
    pub direction: Option<TrendDirection>,
    pub message: String,
}

/// Full insight report across a user's habits
#[derive(Debug, Clone, Serialize)]
pub struct InsightsReport {
    pub time_frame: TimeFrame,
    pub summary: HabitsSummary,
    pub habits: Vec<HabitInsight>,
    pub highlights: Vec<String>,
}

/// Analytics engine for processing habit data
#[derive(Debug, Default)]
pub struct AnalyticsEngine;

impl AnalyticsEngine {
    /// Create a new analytics engine
    pub fn new() -> Self {
        Self
    }

    /// Series statistics and trend assessment for one habit
    pub fn habit_insight(&self, habit: &Habit, time_frame: TimeFrame, today: NaiveDate) -> HabitInsight {
        let series = time_frame.filter(&progress_series(&habit.completions, habit.goal), today);
        let statistics = compute_series_statistics(&series);
        let today_progress = compute_daily_progress(&habit.completions, habit.goal, today);

        let message = match &statistics {
            Some(stats) => performance_message(stats.trend).to_string(),
            None => "No completions recorded in this period yet.".to_string(),
        };

        HabitInsight {
            habit_id: habit.id.clone(),
            title: habit.title.clone(),
            current_streak: compute_current_streak(&habit.completions, habit.goal, today),
            today_status: ProgressStatus::from_percentage(today_progress).label().to_string(),
            direction: statistics.as_ref().map(SeriesStatistics::direction),
            statistics,
            message,
        }
    }

    /// Build the insight report for a set of habits
    pub fn build_report(&self, habits: &[Habit], time_frame: TimeFrame, today: NaiveDate) -> InsightsReport {
        let insights: Vec<HabitInsight> = habits
            .iter()
            .map(|habit| self.habit_insight(habit, time_frame, today))
            .collect();
        let summary = summarize_habits(habits);
        let highlights = self.generate_highlights(&summary, &insights);

        InsightsReport {
            time_frame,
            summary,
            habits: insights,
            highlights,
        }
    }

    /// Short messages about the overall picture
    fn generate_highlights(&self, summary: &HabitsSummary, insights: &[HabitInsight]) -> Vec<String> {
        let mut highlights = Vec::new();

        if summary.total_habits == 0 {
            highlights.push("Start by creating your first habit to track!".to_string());
            return highlights;
        }

        if summary.total_check_ins == 0 {
            highlights.push("Great job creating habits! Now start logging your progress.".to_string());
            return highlights;
        }

        highlights.push(format!(
            "You have {} active habit{} with {} total check-ins and {}% average completion.",
            summary.active_habits,
            if summary.active_habits == 1 { "" } else { "s" },
            summary.total_check_ins,
            summary.average_completion
        ));

        let trends = insights
            .iter()
            .filter_map(|insight| insight.statistics.as_ref().map(|stats| (insight, stats.trend)));

        if let Some((best, trend)) = trends.clone().filter(|(_, trend)| *trend > 0.0).max_by(|a, b| a.1.total_cmp(&b.1)) {
            highlights.push(format!("'{}' is improving the most (+{:.1} points).", best.title, trend));
        }
        if let Some((worst, trend)) = trends.filter(|(_, trend)| *trend < 0.0).min_by(|a, b| a.1.total_cmp(&b.1)) {
            highlights.push(format!("'{}' needs attention ({:.1} points).", worst.title, trend));
        }

        if let Some(top) = insights.iter().filter(|insight| insight.current_streak > 0).max_by_key(|insight| insight.current_streak) {
            highlights.push(format!(
                "Longest running streak: '{}' at {} day{}.",
                top.title,
                top.current_streak,
                if top.current_streak == 1 { "" } else { "s" }
            ));
        }

        highlights
    }
}
