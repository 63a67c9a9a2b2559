/// CompletionRecord: the per-day unit count for a habit
///
/// Every record is keyed by a UTC calendar day. A habit holds at most one
/// record per day; submissions for a day that already has a record replace
/// its count instead of appending.

use serde::{Deserialize, Serialize};
use chrono::{Duration, NaiveDate};
use crate::domain::DomainError;

/// How far back a completion may be backfilled
pub const MAX_BACKFILL_DAYS: i64 = 365;

/// Units performed toward a habit's goal on one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    /// UTC calendar day this record counts toward
    pub date: NaiveDate,
    /// Units recorded, always within `[0, goal]` of the owning habit
    pub count: u32,
}

impl CompletionRecord {
    pub fn new(date: NaiveDate, count: u32) -> Self {
        Self { date, count }
    }

    /// Whether this record reaches the given goal
    pub fn is_met(&self, goal: u32) -> bool {
        self.count >= goal
    }
}

/// Find the record for a day, if any
pub fn find_record(completions: &[CompletionRecord], day: NaiveDate) -> Option<&CompletionRecord> {
    completions.iter().find(|record| record.date == day)
}

/// Whether the record for `day` exists and reaches `goal`
pub fn is_day_met(completions: &[CompletionRecord], goal: u32, day: NaiveDate) -> bool {
    find_record(completions, day).is_some_and(|record| record.is_met(goal))
}

/// Reject a submission day that lies in the future or too far in the past
///
/// `today` is the UTC calendar day the submission is evaluated against.
pub fn validate_submission_day(day: NaiveDate, today: NaiveDate) -> Result<(), DomainError> {
    if day > today {
        return Err(DomainError::MalformedDate(
            "Cannot record completions for future dates".to_string()
        ));
    }

    if day < today - Duration::days(MAX_BACKFILL_DAYS) {
        return Err(DomainError::MalformedDate(
            "Cannot record completions more than 1 year in the past".to_string()
        ));
    }

    Ok(())
}
