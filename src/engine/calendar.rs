/// Day-level calendars and month grouping

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use chrono::{Datelike, Months, NaiveDate, Weekday};

use crate::domain::{CompletionRecord, Habit};
use crate::engine::day::normalize_day;
use crate::engine::progress::percentage;

/// One calendar cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub day: NaiveDate,
    /// A completion record exists for this day
    pub recorded: bool,
    pub met: bool,
    pub progress: u8,
}

/// One entry per day in `[start, end]`, ascending, with gaps unmet at 0%
pub fn build_calendar(
    completions: &[CompletionRecord],
    goal: u32,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<CalendarDay> {
    let counts: HashMap<NaiveDate, u32> = completions
        .iter()
        .map(|record| (record.date, record.count))
        .collect();

    start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| match counts.get(&day) {
            Some(count) => CalendarDay {
                day,
                recorded: true,
                met: *count >= goal,
                progress: percentage(*count, goal),
            },
            None => CalendarDay {
                day,
                recorded: false,
                met: false,
                progress: 0,
            },
        })
        .collect()
}

/// Weekday with the best average progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayAverage {
    /// Full English name, e.g. "Monday"
    pub weekday: String,
    pub average: u8,
}

/// Summary figures for a calendar window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarStatistics {
    pub total_days: u32,
    pub recorded_days: u32,
    /// Recorded days as a percentage of all days in the window
    pub completion_rate: u8,
    /// Mean progress over recorded days
    pub average_progress: u8,
    /// `None` when nothing is recorded in the window
    pub best_weekday: Option<WeekdayAverage>,
}

const WEEKDAYS_FROM_SUNDAY: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn rounded_percent(part: f64, whole: f64) -> u8 {
    if whole <= 0.0 {
        return 0;
    }
    (part / whole * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Completion rate, average progress and best weekday over calendar days
///
/// Weekdays are scanned from Sunday and only a strictly higher average
/// replaces the current best, so ties keep the earlier weekday.
pub fn calendar_statistics(days: &[CalendarDay]) -> CalendarStatistics {
    let mut counts = [0u32; 7];
    let mut sums = [0u32; 7];
    let mut recorded_days = 0u32;
    let mut progress_total = 0u32;

    for entry in days.iter().filter(|entry| entry.recorded) {
        let index = entry.day.weekday().num_days_from_sunday() as usize;
        counts[index] += 1;
        sums[index] += u32::from(entry.progress);
        recorded_days += 1;
        progress_total += u32::from(entry.progress);
    }

    let mut best: Option<(usize, f64)> = None;
    for (index, (count, sum)) in counts.iter().zip(sums.iter()).enumerate() {
        if *count == 0 {
            continue;
        }
        let average = f64::from(*sum) / f64::from(*count);
        if best.map_or(true, |(_, top)| average > top) {
            best = Some((index, average));
        }
    }

    let total_days = days.len() as u32;
    let average_progress = if recorded_days == 0 {
        0
    } else {
        (f64::from(progress_total) / f64::from(recorded_days)).round() as u8
    };

    CalendarStatistics {
        total_days,
        recorded_days,
        completion_rate: rounded_percent(f64::from(recorded_days), f64::from(total_days)),
        average_progress,
        best_weekday: best.map(|(index, average)| WeekdayAverage {
            weekday: weekday_name(WEEKDAYS_FROM_SUNDAY[index]).to_string(),
            average: average.round() as u8,
        }),
    }
}

/// A month of calendar days
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    pub met_days: u32,
    pub days: Vec<CalendarDay>,
}

/// Group calendar days into months, preserving order
pub fn group_by_month(days: &[CalendarDay]) -> Vec<CalendarMonth> {
    let mut months: Vec<CalendarMonth> = Vec::new();

    for entry in days {
        let (year, month) = (entry.day.year(), entry.day.month());
        let needs_new = months
            .last()
            .map_or(true, |current| current.year != year || current.month != month);

        if needs_new {
            months.push(CalendarMonth {
                year,
                month,
                met_days: 0,
                days: Vec::new(),
            });
        }

        if let Some(current) = months.last_mut() {
            if entry.met {
                current.met_days += 1;
            }
            current.days.push(*entry);
        }
    }

    months
}

/// First day of the month containing `day`
pub fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

/// First day of the first month the habit was active in
///
/// That is the month of the earlier of its creation day and its earliest
/// completion record.
pub fn calendar_start(habit: &Habit) -> NaiveDate {
    let created = normalize_day(&habit.created_at);
    let earliest = habit
        .completions
        .iter()
        .map(|record| record.date)
        .min()
        .map_or(created, |first| first.min(created));
    first_of_month(earliest)
}

/// A range of days to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Select `months` whole months ending `offset` months before the current one
///
/// The window never starts before `earliest` and never ends after `today`;
/// an offset reaching past `earliest` is pulled back to the earliest month.
pub fn month_window(today: NaiveDate, months: u32, offset: u32, earliest: NaiveDate) -> CalendarWindow {
    let months = months.max(1);
    let current = first_of_month(today);
    let earliest = earliest.min(today);

    let max_offset = months_between(first_of_month(earliest), current);
    let offset = offset.min(max_offset);

    let last_month = current
        .checked_sub_months(Months::new(offset))
        .unwrap_or(current);
    let first_month = last_month
        .checked_sub_months(Months::new(months - 1))
        .unwrap_or(last_month);
    let end = last_month
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(last_month);

    CalendarWindow {
        start: first_month.max(earliest),
        end: end.min(today),
    }
}

fn months_between(from: NaiveDate, to: NaiveDate) -> u32 {
    let diff = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    diff.max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Frequency, UserId};
    use chrono::{TimeZone, Utc};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_calendar_fills_every_day() {
        let start = day(2024, 2, 20);
        let end = day(2024, 3, 5);
        let calendar = build_calendar(&[], 1, start, end);

        assert_eq!(calendar.len() as i64, (end - start).num_days() + 1);
        assert!(calendar.iter().all(|entry| !entry.met && entry.progress == 0));
        assert_eq!(calendar.first().unwrap().day, start);
        assert_eq!(calendar.last().unwrap().day, end);
    }

    #[test]
    fn test_calendar_marks_recorded_days() {
        let completions = vec![
            CompletionRecord::new(day(2024, 1, 2), 2),
            CompletionRecord::new(day(2024, 1, 3), 1),
            CompletionRecord::new(day(2024, 1, 9), 2),
        ];
        let calendar = build_calendar(&completions, 2, day(2024, 1, 1), day(2024, 1, 4));

        assert_eq!(calendar.len(), 4);
        assert_eq!(calendar[0], CalendarDay { day: day(2024, 1, 1), recorded: false, met: false, progress: 0 });
        assert_eq!(calendar[1], CalendarDay { day: day(2024, 1, 2), recorded: true, met: true, progress: 100 });
        assert_eq!(calendar[2], CalendarDay { day: day(2024, 1, 3), recorded: true, met: false, progress: 50 });
    }

    #[test]
    fn test_inverted_range_is_empty() {
        assert!(build_calendar(&[], 1, day(2024, 1, 5), day(2024, 1, 4)).is_empty());
    }

    #[test]
    fn test_group_by_month() {
        let completions = vec![CompletionRecord::new(day(2024, 2, 28), 1)];
        let calendar = build_calendar(&completions, 1, day(2024, 1, 30), day(2024, 3, 2));
        let months = group_by_month(&calendar);

        assert_eq!(months.len(), 3);
        assert_eq!((months[0].year, months[0].month, months[0].days.len()), (2024, 1, 2));
        assert_eq!((months[1].month, months[1].days.len(), months[1].met_days), (2, 29, 1));
        assert_eq!((months[2].month, months[2].days.len()), (3, 2));
    }

    #[test]
    fn test_calendar_start_uses_earliest_activity() {
        let mut habit = Habit::new(UserId::new(), "Walk".to_string(), None, Frequency::Daily, 1).unwrap();
        habit.created_at = Utc.with_ymd_and_hms(2024, 5, 17, 12, 0, 0).unwrap();
        assert_eq!(calendar_start(&habit), day(2024, 5, 1));

        habit.completions.push(CompletionRecord::new(day(2024, 3, 9), 1));
        assert_eq!(calendar_start(&habit), day(2024, 3, 1));
    }

    #[test]
    fn test_month_window() {
        let today = day(2024, 6, 18);
        let earliest = day(2023, 11, 1);

        let recent = month_window(today, 3, 0, earliest);
        assert_eq!(recent, CalendarWindow { start: day(2024, 4, 1), end: today });

        let older = month_window(today, 3, 3, earliest);
        assert_eq!(older, CalendarWindow { start: day(2024, 1, 1), end: day(2024, 3, 31) });

        let clamped = month_window(today, 3, 50, earliest);
        assert_eq!(clamped, CalendarWindow { start: earliest, end: day(2023, 11, 30) });
    }

    #[test]
    fn test_month_window_starts_no_earlier_than_habit() {
        let today = day(2024, 6, 18);
        let window = month_window(today, 6, 0, day(2024, 5, 1));
        assert_eq!(window.start, day(2024, 5, 1));
        assert_eq!(window.end, today);
    }

    #[test]
    fn test_statistics_for_empty_window() {
        let stats = calendar_statistics(&[]);
        assert_eq!(stats.total_days, 0);
        assert_eq!(stats.completion_rate, 0);
        assert_eq!(stats.average_progress, 0);
        assert_eq!(stats.best_weekday, None);

        let quiet = calendar_statistics(&build_calendar(&[], 1, day(2024, 1, 1), day(2024, 1, 7)));
        assert_eq!((quiet.total_days, quiet.recorded_days, quiet.completion_rate), (7, 0, 0));
        assert_eq!(quiet.best_weekday, None);
    }

    #[test]
    fn test_statistics_for_single_weekday() {
        // 2024-01-01 and 2024-01-08 are Mondays
        let completions = vec![
            CompletionRecord::new(day(2024, 1, 1), 1),
            CompletionRecord::new(day(2024, 1, 8), 2),
        ];
        let calendar = build_calendar(&completions, 2, day(2024, 1, 1), day(2024, 1, 10));
        let stats = calendar_statistics(&calendar);

        assert_eq!(stats.total_days, 10);
        assert_eq!(stats.recorded_days, 2);
        assert_eq!(stats.completion_rate, 20);
        assert_eq!(stats.average_progress, 75);
        assert_eq!(
            stats.best_weekday,
            Some(WeekdayAverage { weekday: "Monday".to_string(), average: 75 })
        );
    }

    #[test]
    fn test_best_weekday_tie_keeps_earliest_from_sunday() {
        // 2024-01-06 is a Saturday, 2024-01-07 a Sunday, 2024-01-09 a Tuesday
        let completions = vec![
            CompletionRecord::new(day(2024, 1, 6), 1),
            CompletionRecord::new(day(2024, 1, 7), 1),
            CompletionRecord::new(day(2024, 1, 9), 1),
        ];
        let calendar = build_calendar(&completions, 1, day(2024, 1, 6), day(2024, 1, 9));
        let stats = calendar_statistics(&calendar);

        assert_eq!(stats.completion_rate, 75);
        assert_eq!(stats.best_weekday.unwrap().weekday, "Sunday");
    }

    #[test]
    fn test_recorded_zero_count_day_still_counts_as_recorded() {
        let completions = vec![CompletionRecord::new(day(2024, 1, 3), 0)];
        let stats = calendar_statistics(&build_calendar(&completions, 1, day(2024, 1, 3), day(2024, 1, 4)));

        assert_eq!(stats.recorded_days, 1);
        assert_eq!(stats.completion_rate, 50);
        assert_eq!(
            stats.best_weekday,
            Some(WeekdayAverage { weekday: "Wednesday".to_string(), average: 0 })
        );
    }
}
