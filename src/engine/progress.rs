/// Per-day progress percentages

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use crate::domain::{find_record, CompletionRecord};

/// Percentage of `goal` reached by `count`, rounded half up
///
/// 100 is reserved for met days: a count short of the goal reports at most 99
/// even when it would round up.
pub fn percentage(count: u32, goal: u32) -> u8 {
    // goal is validated positive at the habit boundary
    let goal = u64::from(goal.max(1));
    let count = u64::from(count);
    if count >= goal {
        return 100;
    }
    let rounded = (200 * count + goal) / (2 * goal);
    rounded.min(99) as u8
}

/// Progress toward `goal` on `day`; 0 when the day has no record
pub fn compute_daily_progress(completions: &[CompletionRecord], goal: u32, day: NaiveDate) -> u8 {
    find_record(completions, day)
        .map(|record| percentage(record.count, goal))
        .unwrap_or(0)
}

/// One day's progress as fed into series statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressPoint {
    pub day: NaiveDate,
    pub progress: u8,
}

/// Progress for every recorded day, oldest first
pub fn progress_series(completions: &[CompletionRecord], goal: u32) -> Vec<ProgressPoint> {
    let mut series: Vec<ProgressPoint> = completions
        .iter()
        .map(|record| ProgressPoint {
            day: record.date,
            progress: percentage(record.count, goal),
        })
        .collect();
    series.sort_by_key(|point| point.day);
    series
}

/// Human-readable bucket for a progress percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    NotStarted,
    JustBeginning,
    InProgress,
    WellUnderway,
    AlmostThere,
    Completed,
}

impl ProgressStatus {
    pub fn from_percentage(progress: u8) -> Self {
        match progress {
            0 => ProgressStatus::NotStarted,
            1..=25 => ProgressStatus::JustBeginning,
            26..=50 => ProgressStatus::InProgress,
            51..=75 => ProgressStatus::WellUnderway,
            76..=99 => ProgressStatus::AlmostThere,
            _ => ProgressStatus::Completed,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "Not Started",
            ProgressStatus::JustBeginning => "Just Beginning",
            ProgressStatus::InProgress => "In Progress",
            ProgressStatus::WellUnderway => "Well Underway",
            ProgressStatus::AlmostThere => "Almost There",
            ProgressStatus::Completed => "Completed",
        }
    }
}
