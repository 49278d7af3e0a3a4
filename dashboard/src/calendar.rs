//! UTC calendar arithmetic used by the bucketer and the aggregate views.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Granularity of a calendar period whose rate is being computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodKind {
    Month,
    Year,
}

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// 1-based ordinal day within the date's year.
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

pub fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) { 366 } else { 365 }
}

/// Number of days in `month` (1-12) of `year`: the day before the 1st of the next month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

pub fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Steps `months` whole months back from `(year, month)`.
pub fn months_back(year: i32, month: u32, months: u32) -> Option<(i32, u32)> {
    let index = i64::from(year) * 12 + i64::from(month) - 1 - i64::from(months);
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    Some((year, index.rem_euclid(12) as u32 + 1))
}

/// Days elapsed in the period starting at `period_start`.
///
/// The period containing `now` is still in progress, so only the days up to and
/// including today count; any other period contributes its full length.
pub fn units_elapsed(period_start: NaiveDate, kind: PeriodKind, now: DateTime<Utc>) -> u32 {
    let today = now.date_naive();
    let same_year = period_start.year() == today.year();
    match kind {
        PeriodKind::Year if same_year => day_of_year(today),
        PeriodKind::Year => days_in_year(period_start.year()),
        PeriodKind::Month if same_year && period_start.month() == today.month() => today.day(),
        PeriodKind::Month => days_in_month(period_start.year(), period_start.month()),
    }
}
