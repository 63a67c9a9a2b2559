/// Calendar-day normalization
///
/// Every day in this crate is a UTC calendar day. Timestamps are converted to
/// UTC before the time of day is dropped, and "today" is always the current
/// UTC day, so two timestamps on the same UTC day compare equal as map keys.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use crate::domain::DomainError;

/// Truncate a timestamp in any time zone to its UTC calendar day
pub fn normalize_day<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> NaiveDate {
    timestamp.with_timezone(&Utc).date_naive()
}

/// The current UTC calendar day
pub fn today() -> NaiveDate {
    normalize_day(&Utc::now())
}

/// The day before `day`, or `None` at the start of the supported range
pub fn previous_day(day: NaiveDate) -> Option<NaiveDate> {
    day.pred_opt()
}

/// Parse a client-supplied date into a UTC calendar day
///
/// Accepts a plain `YYYY-MM-DD` date or an RFC 3339 timestamp. Anything else
/// is a `MalformedDate`.
pub fn parse_day(input: &str) -> Result<NaiveDate, DomainError> {
    let trimmed = input.trim();

    if let Ok(day) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(day);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|timestamp| normalize_day(&timestamp))
        .map_err(|_| DomainError::MalformedDate(format!(
            "'{}' is not a date (expected YYYY-MM-DD or an RFC 3339 timestamp)",
            trimmed
        )))
}

/// Number of calendar days in `[start, end]`, zero when `start > end`
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> usize {
    if start > end {
        return 0;
    }
    ((end - start).num_days() + 1) as usize
}

/// `day` shifted back by `days`, saturating at the earliest representable day
pub fn days_before(day: NaiveDate, days: i64) -> NaiveDate {
    day.checked_sub_signed(Duration::days(days)).unwrap_or(NaiveDate::MIN)
}
