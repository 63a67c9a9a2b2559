/// Series statistics and time-frame filtering for progress trends

use serde::{Deserialize, Serialize};
use chrono::{Months, NaiveDate};

use crate::domain::{DomainError, Habit};
use crate::engine::day::days_before;
use crate::engine::progress::{progress_series, ProgressPoint};

/// Trend magnitude, in percentage points, beyond which a change is significant
pub const SIGNIFICANT_TREND: f64 = 5.0;

/// Aggregates over a window of daily progress values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStatistics {
    /// Mean progress over the whole window
    pub average: f64,
    /// Mean of the later half minus mean of the earlier half
    pub trend: f64,
    pub best_day: ProgressPoint,
    pub worst_day: ProgressPoint,
    /// Number of days in the window
    pub total_days: usize,
}

impl SeriesStatistics {
    pub fn direction(&self) -> TrendDirection {
        TrendDirection::from_trend(self.trend)
    }
}

/// Compute average, trend and best/worst days of a progress series
///
/// The series is ordered by day before it is split at `len / 2` for the
/// trend. Best and worst days are the first maximum and first minimum in
/// input order. Returns `None` for an empty series.
pub fn compute_series_statistics(series: &[ProgressPoint]) -> Option<SeriesStatistics> {
    let first = *series.first()?;

    let mut sorted = series.to_vec();
    sorted.sort_by_key(|point| point.day);

    let average = mean(&sorted);
    let (earlier, later) = sorted.split_at(sorted.len() / 2);
    let trend = if earlier.is_empty() {
        0.0
    } else {
        mean(later) - mean(earlier)
    };

    let mut best_day = first;
    let mut worst_day = first;
    for point in series.iter().skip(1) {
        if point.progress > best_day.progress {
            best_day = *point;
        }
        if point.progress < worst_day.progress {
            worst_day = *point;
        }
    }

    Some(SeriesStatistics {
        average,
        trend,
        best_day,
        worst_day,
        total_days: series.len(),
    })
}

fn mean(points: &[ProgressPoint]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let total: f64 = points.iter().map(|point| f64::from(point.progress)).sum();
    total / points.len() as f64
}

/// Direction of a progress trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

impl TrendDirection {
    pub fn from_trend(trend: f64) -> Self {
        if trend > 0.0 {
            TrendDirection::Improving
        } else if trend < 0.0 {
            TrendDirection::Declining
        } else {
            TrendDirection::Stable
        }
    }
}

/// Short assessment of a trend value
pub fn performance_message(trend: f64) -> &'static str {
    if trend > SIGNIFICANT_TREND {
        "Great improvement! You're making excellent progress on this habit."
    } else if trend > 0.0 {
        "Steady improvement. Keep up the good work!"
    } else if trend < -SIGNIFICANT_TREND {
        "This habit has been declining significantly. Consider what challenges you're facing."
    } else if trend < 0.0 {
        "Slight decline in progress. Try to refocus on this habit."
    } else {
        "Consistent performance. Consider increasing your goal to challenge yourself."
    }
}

/// Window of history to analyze, relative to today
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFrame {
    Week,
    Month,
    Year,
    #[default]
    All,
}

impl TimeFrame {
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim().to_lowercase().as_str() {
            "week" => Ok(TimeFrame::Week),
            "month" => Ok(TimeFrame::Month),
            "year" => Ok(TimeFrame::Year),
            "all" => Ok(TimeFrame::All),
            other => Err(DomainError::Validation {
                message: format!(
                    "Invalid time frame '{}'. Valid options: week, month, year, all",
                    other
                ),
            }),
        }
    }

    /// Boundary day of the window, `None` for all time
    ///
    /// The boundary itself is outside the window, so `Week` keeps today and
    /// the six days before it.
    pub fn cutoff(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            TimeFrame::Week => Some(days_before(today, 7)),
            TimeFrame::Month => Some(today.checked_sub_months(Months::new(1)).unwrap_or(NaiveDate::MIN)),
            TimeFrame::Year => Some(today.checked_sub_months(Months::new(12)).unwrap_or(NaiveDate::MIN)),
            TimeFrame::All => None,
        }
    }

    /// Keep the points that fall inside the window
    pub fn filter(&self, series: &[ProgressPoint], today: NaiveDate) -> Vec<ProgressPoint> {
        match self.cutoff(today) {
            Some(cutoff) => series.iter().copied().filter(|point| point.day > cutoff).collect(),
            None => series.to_vec(),
        }
    }
}

/// Figures across all of a user's habits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitsSummary {
    pub total_habits: usize,
    /// Habits with at least one completion record
    pub active_habits: usize,
    /// Completion records across all habits
    pub total_check_ins: usize,
    /// Mean over active habits of each habit's mean recorded-day progress
    pub average_completion: u8,
}

pub fn summarize_habits(habits: &[Habit]) -> HabitsSummary {
    let per_habit_averages: Vec<f64> = habits
        .iter()
        .filter(|habit| !habit.completions.is_empty())
        .map(|habit| mean(&progress_series(&habit.completions, habit.goal)))
        .collect();

    let average_completion = if per_habit_averages.is_empty() {
        0
    } else {
        let total: f64 = per_habit_averages.iter().sum();
        (total / per_habit_averages.len() as f64).round() as u8
    };

    HabitsSummary {
        total_habits: habits.len(),
        active_habits: per_habit_averages.len(),
        total_check_ins: habits.iter().map(|habit| habit.completions.len()).sum(),
        average_completion,
    }
}
