/// Streak calculation and completion recording
///
/// A streak is the number of consecutive UTC calendar days, ending today or
/// yesterday, on which a habit's goal was met. Everything here is a pure
/// function of its arguments; "today" is always passed in.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use chrono::NaiveDate;

use crate::domain::{find_record, is_day_met, CompletionRecord, Habit, HabitId};
use crate::engine::day::previous_day;
use crate::engine::progress::{compute_daily_progress, ProgressStatus};

/// How a completion submission changes the stored count for its day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountUpdate {
    /// Replace the day's count
    Set(u32),
    /// Add to the day's current count (zero when there is no record yet)
    Add(u32),
}

impl CountUpdate {
    fn requested(self, current: u32) -> u32 {
        match self {
            CountUpdate::Set(count) => count,
            CountUpdate::Add(delta) => current.saturating_add(delta),
        }
    }
}

/// Apply a completion submission for `day` and return the updated habit
///
/// The day's record is upserted with its count clamped to `[0, goal]`.
/// When the submission makes the day reach its goal, the cached streak
/// extends if the previous day was met and restarts at 1 otherwise.
/// A submission that leaves the day below goal, or a day that was already
/// met, leaves the cached streak as it was.
pub fn record_completion(habit: &Habit, day: NaiveDate, update: CountUpdate) -> Habit {
    let mut updated = habit.clone();
    let goal = updated.goal;

    let previous = find_record(&updated.completions, day).map(|record| record.count);
    let was_met = previous.is_some_and(|count| count >= goal);
    let count = update.requested(previous.unwrap_or(0)).min(goal);

    match updated.completions.iter_mut().find(|record| record.date == day) {
        Some(record) => record.count = count,
        None => updated.completions.push(CompletionRecord::new(day, count)),
    }

    let met_now = count >= goal;
    if met_now && !was_met {
        let yesterday_met = previous_day(day)
            .is_some_and(|yesterday| is_day_met(&updated.completions, goal, yesterday));

        updated.streak = if yesterday_met {
            updated.streak.saturating_add(1)
        } else {
            1
        };
    }

    tracing::debug!(
        habit_id = %updated.id,
        %day,
        count,
        streak = updated.streak,
        "recorded completion"
    );

    updated
}

/// Recompute the current streak from the completion records
///
/// Counting starts today when today has a record; otherwise it starts
/// yesterday if yesterday was met, and the streak is 0 if it was not.
/// The walk goes back one day at a time and stops at the first day without
/// a met record.
pub fn compute_current_streak(completions: &[CompletionRecord], goal: u32, today: NaiveDate) -> u32 {
    if completions.is_empty() {
        return 0;
    }

    let counts: HashMap<NaiveDate, u32> = completions
        .iter()
        .map(|record| (record.date, record.count))
        .collect();
    let met = |day: NaiveDate| counts.get(&day).is_some_and(|count| *count >= goal);

    let start = if counts.contains_key(&today) {
        today
    } else {
        match previous_day(today) {
            Some(yesterday) if met(yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut streak = 0;
    let mut expected = Some(start);
    while let Some(day) = expected {
        if !met(day) {
            break;
        }
        streak += 1;
        expected = previous_day(day);
    }

    streak
}

/// Longest run of consecutive met days anywhere in the history
pub fn compute_longest_streak(completions: &[CompletionRecord], goal: u32) -> u32 {
    let mut met_days: Vec<NaiveDate> = completions
        .iter()
        .filter(|record| record.is_met(goal))
        .map(|record| record.date)
        .collect();
    met_days.sort();
    met_days.dedup();

    let mut longest = 0;
    let mut current = 0;
    let mut last: Option<NaiveDate> = None;

    for day in met_days {
        current = match last {
            Some(prev) if (day - prev).num_days() == 1 => current + 1,
            _ => 1,
        };
        longest = longest.max(current);
        last = Some(day);
    }

    longest
}

/// Overwrite the cached streak with the recomputed value
pub fn refresh_streak(habit: &mut Habit, today: NaiveDate) {
    habit.streak = compute_current_streak(&habit.completions, habit.goal, today);
}

/// Derived streak and progress figures for one habit as of a given day
///
/// Every call site that displays a streak or today's progress builds it
/// from this summary so they cannot disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakSummary {
    /// Which habit this summary is for
    pub habit_id: HabitId,
    /// Consecutive met days ending today or yesterday
    pub current_streak: u32,
    /// Best run of consecutive met days ever
    pub longest_streak: u32,
    /// Most recent day whose goal was met
    pub last_met: Option<NaiveDate>,
    /// Days with any completion record
    pub total_check_ins: u32,
    /// Days whose goal was met
    pub met_days: u32,
    /// Progress toward today's goal, 0-100
    pub today_progress: u8,
    /// Label for today's progress
    pub today_status: ProgressStatus,
}

impl StreakSummary {
    /// Summarize a habit as of `today`
    pub fn from_habit(habit: &Habit, today: NaiveDate) -> Self {
        let goal = habit.goal;
        let met: Vec<&CompletionRecord> = habit
            .completions
            .iter()
            .filter(|record| record.is_met(goal))
            .collect();
        let today_progress = compute_daily_progress(&habit.completions, goal, today);

        Self {
            habit_id: habit.id.clone(),
            current_streak: compute_current_streak(&habit.completions, goal, today),
            longest_streak: compute_longest_streak(&habit.completions, goal),
            last_met: met.iter().map(|record| record.date).max(),
            total_check_ins: habit.completions.len() as u32,
            met_days: met.len() as u32,
            today_progress,
            today_status: ProgressStatus::from_percentage(today_progress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Frequency, UserId};
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn days_ago(n: i64) -> NaiveDate {
        today() - Duration::days(n)
    }

    fn habit_with_goal(goal: i64) -> Habit {
        Habit::new(UserId::new(), "Stretch".to_string(), None, Frequency::Daily, goal).unwrap()
    }

    fn records(entries: &[(i64, u32)]) -> Vec<CompletionRecord> {
        entries
            .iter()
            .map(|(ago, count)| CompletionRecord::new(days_ago(*ago), *count))
            .collect()
    }

    #[test]
    fn test_count_is_clamped_to_goal() {
        let habit = habit_with_goal(3);
        for requested in [0, 1, 3, 4, 1_000, u32::MAX] {
            let updated = record_completion(&habit, today(), CountUpdate::Set(requested));
            let record = find_record(&updated.completions, today()).unwrap();
            assert!(record.count <= 3);
            assert_eq!(record.count, requested.min(3));
        }

        let updated = record_completion(&habit, today(), CountUpdate::Add(u32::MAX));
        assert_eq!(updated.completions[0].count, 3);
    }

    #[test]
    fn test_same_day_submission_upserts() {
        let habit = habit_with_goal(3);
        let once = record_completion(&habit, today(), CountUpdate::Set(1));
        let twice = record_completion(&once, today(), CountUpdate::Set(3));

        assert_eq!(twice.completions, vec![CompletionRecord::new(today(), 3)]);
    }

    #[test]
    fn test_add_builds_on_existing_count() {
        let habit = habit_with_goal(3);
        let step1 = record_completion(&habit, today(), CountUpdate::Add(1));
        let step2 = record_completion(&step1, today(), CountUpdate::Add(1));

        assert_eq!(step2.completions.len(), 1);
        assert_eq!(step2.completions[0].count, 2);
        assert_eq!(step2.streak, 0);
    }

    #[test]
    fn test_meeting_goal_extends_or_resets_streak() {
        let mut habit = habit_with_goal(1);
        habit.completions = records(&[(1, 1), (2, 1)]);
        habit.streak = 2;

        let extended = record_completion(&habit, today(), CountUpdate::Set(1));
        assert_eq!(extended.streak, 3);

        let mut broken = habit_with_goal(1);
        broken.completions = records(&[(2, 1)]);
        broken.streak = 5;
        let restarted = record_completion(&broken, today(), CountUpdate::Set(1));
        assert_eq!(restarted.streak, 1);
    }

    #[test]
    fn test_unmet_submission_leaves_streak_alone() {
        let mut habit = habit_with_goal(4);
        habit.streak = 7;
        let updated = record_completion(&habit, today(), CountUpdate::Set(2));
        assert_eq!(updated.streak, 7);
    }

    #[test]
    fn test_resubmitting_a_met_day_does_not_double_count() {
        let mut habit = habit_with_goal(1);
        habit.completions = records(&[(1, 1)]);
        habit.streak = 1;

        let first = record_completion(&habit, today(), CountUpdate::Set(1));
        let second = record_completion(&first, today(), CountUpdate::Set(5));
        assert_eq!(first.streak, 2);
        assert_eq!(second.streak, 2);
    }

    #[test]
    fn test_current_streak_counts_back_from_today() {
        let completions = records(&[(0, 1), (1, 1), (2, 1)]);
        assert_eq!(compute_current_streak(&completions, 1, today()), 3);

        let with_gap = records(&[(0, 1), (1, 1), (2, 1), (4, 1), (5, 1)]);
        assert_eq!(compute_current_streak(&with_gap, 1, today()), 3);
    }

    #[test]
    fn test_missing_today_counts_from_yesterday() {
        let completions = records(&[(1, 1)]);
        assert_eq!(compute_current_streak(&completions, 1, today()), 1);

        let stale = records(&[(2, 1), (3, 1)]);
        assert_eq!(compute_current_streak(&stale, 1, today()), 0);
    }

    #[test]
    fn test_unmet_days_break_the_walk() {
        // yesterday present but short of goal
        let completions = records(&[(1, 1), (2, 2)]);
        assert_eq!(compute_current_streak(&completions, 2, today()), 0);

        let completions = records(&[(0, 2), (1, 1), (2, 2)]);
        assert_eq!(compute_current_streak(&completions, 2, today()), 1);
    }

    #[test]
    fn test_unmet_record_today_ends_streak_at_zero() {
        let completions = records(&[(0, 1), (1, 3), (2, 3)]);
        assert_eq!(compute_current_streak(&completions, 3, today()), 0);
    }

    #[test]
    fn test_future_records_are_ignored() {
        let mut completions = records(&[(0, 1), (1, 1)]);
        completions.push(CompletionRecord::new(today() + Duration::days(1), 1));
        assert_eq!(compute_current_streak(&completions, 1, today()), 2);
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(compute_current_streak(&[], 1, today()), 0);
        assert_eq!(compute_longest_streak(&[], 1), 0);
    }

    #[test]
    fn test_longest_streak() {
        let completions = records(&[(0, 1), (3, 1), (4, 1), (5, 1), (6, 0), (9, 1)]);
        assert_eq!(compute_longest_streak(&completions, 1), 3);
    }

    #[test]
    fn test_cached_streak_agrees_with_recomputation() {
        let mut habit = habit_with_goal(2);
        for ago in (0..6).rev() {
            let day = days_ago(ago);
            habit = record_completion(&habit, day, CountUpdate::Add(1));
            habit = record_completion(&habit, day, CountUpdate::Add(1));
            assert_eq!(habit.streak, compute_current_streak(&habit.completions, 2, day));
        }
        assert_eq!(habit.streak, 6);
    }

    #[test]
    fn test_refresh_streak_after_goal_change() {
        let mut habit = habit_with_goal(1);
        habit.completions = records(&[(0, 1), (1, 1)]);
        habit.streak = 2;

        habit.update(None, None, None, Some(2)).unwrap();
        refresh_streak(&mut habit, today());
        assert_eq!(habit.streak, 0);
    }

    #[test]
    fn test_recomputation_is_idempotent() {
        let completions = records(&[(0, 1), (1, 1), (3, 1)]);
        let first = compute_current_streak(&completions, 1, today());
        let second = compute_current_streak(&completions, 1, today());
        assert_eq!(first, second);
    }

    #[test]
    fn test_summary() {
        let mut habit = habit_with_goal(2);
        habit.completions = records(&[(0, 1), (1, 2), (2, 2), (5, 2)]);

        let summary = StreakSummary::from_habit(&habit, today());
        assert_eq!(summary.current_streak, 0);
        assert_eq!(summary.longest_streak, 2);
        assert_eq!(summary.last_met, Some(days_ago(1)));
        assert_eq!(summary.total_check_ins, 4);
        assert_eq!(summary.met_days, 3);
        assert_eq!(summary.today_progress, 50);
        assert_eq!(summary.today_status, ProgressStatus::InProgress);
    }
}
