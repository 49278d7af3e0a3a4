//! Headline numbers shown next to the chart and served by the JSON API.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use serde::Serialize;

use crate::charts::round2;
use crate::events::Event;

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub total: usize,
    pub avg_last_30: f64,
    pub avg_last_365: f64,
    pub avg_lifetime: f64,
    /// Busiest hour of day over the last 30 days.
    pub peak_hour: Option<u32>,
}

/// `SummaryStats` formatted for display, with neutral placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryReport {
    pub total: String,
    pub avg_last_30: String,
    pub avg_last_365: String,
    pub avg_lifetime: String,
    pub peak_slot: String,
}

impl SummaryStats {
    pub fn report(&self) -> SummaryReport {
        SummaryReport {
            total: self.total.to_string(),
            avg_last_30: format!("{:.2}", self.avg_last_30),
            avg_last_365: format!("{:.2}", self.avg_last_365),
            avg_lifetime: format!("{:.2}", self.avg_lifetime),
            peak_slot: self
                .peak_hour
                .map(|hour| format!("{hour:02}:00"))
                .unwrap_or_else(|| "-".to_owned()),
        }
    }
}

pub fn summarize(events: &[Event], now: DateTime<Utc>) -> SummaryStats {
    let total = events.len();
    let last_30: Vec<&Event> = trailing_days(events, now, 30).collect();
    let last_365 = trailing_days(events, now, 365).count();

    SummaryStats {
        total,
        avg_last_30: last_30.len() as f64 / 30.0,
        avg_last_365: last_365 as f64 / 365.0,
        avg_lifetime: lifetime_average(events, now),
        peak_hour: peak_hour(last_30.iter().copied()),
    }
}

/// Events dated within the `days` calendar days ending today, today included.
fn trailing_days(
    events: &[Event],
    now: DateTime<Utc>,
    days: u64,
) -> impl Iterator<Item = &Event> {
    let today = now.date_naive();
    let first = today
        .checked_sub_days(Days::new(days.saturating_sub(1)))
        .unwrap_or(NaiveDate::MIN);
    events.iter().filter(move |e| {
        let day = e.occurred_at.date_naive();
        first <= day && day <= today
    })
}

fn lifetime_average(events: &[Event], now: DateTime<Utc>) -> f64 {
    let Some(earliest) = events.iter().map(|e| e.occurred_at).min() else {
        return 0.0;
    };
    let days = (now - earliest).num_days().max(1);
    events.len() as f64 / days as f64
}

/// Hour of day with the most events. On a tie the hour seen first wins.
fn peak_hour<'a>(events: impl Iterator<Item = &'a Event>) -> Option<u32> {
    let mut seen: Vec<(u32, usize)> = Vec::new();
    for event in events {
        let hour = event.occurred_at.hour();
        match seen.iter_mut().find(|(h, _)| *h == hour) {
            Some((_, count)) => *count += 1,
            None => seen.push((hour, 1)),
        }
    }

    let mut best: Option<(u32, usize)> = None;
    for (hour, count) in seen {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((hour, count));
        }
    }
    best.map(|(hour, _)| hour)
}

/// When the newest entry happened, relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastEntry {
    Today(NaiveTime),
    Yesterday(NaiveTime),
    DaysAgo { days: i64, time: NaiveTime },
}

impl fmt::Display for LastEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LastEntry::Today(time) => write!(f, "Today: {}", time.format("%H:%M")),
            LastEntry::Yesterday(time) => write!(f, "Yesterday: {}", time.format("%H:%M")),
            LastEntry::DaysAgo { days, time } => {
                write!(f, "{days} days ago at {}", time.format("%H:%M"))
            }
        }
    }
}

pub fn last_entry(events: &[Event], now: DateTime<Utc>) -> Option<LastEntry> {
    let newest = events.iter().map(|e| e.occurred_at).max()?;
    let time = newest.time().with_second(0)?.with_nanosecond(0)?;
    let days = (now.date_naive() - newest.date_naive()).num_days();
    Some(match days {
        ..=0 => LastEntry::Today(time),
        1 => LastEntry::Yesterday(time),
        days => LastEntry::DaysAgo { days, time },
    })
}

/// Compact age of the newest entry: minutes, then hours, then days.
pub fn freshness(events: &[Event], now: DateTime<Utc>) -> Option<String> {
    let newest = events.iter().map(|e| e.occurred_at).max()?;
    Some(format_age(now - newest))
}

fn format_age(age: Duration) -> String {
    let minutes = age.num_seconds().max(0) as f64 / 60.0;
    if minutes < 60.0 {
        format!("{}m", minutes.round())
    } else if minutes <= 1440.0 {
        format!("{:.1}h", minutes / 60.0)
    } else {
        format!("{}d", (minutes / 1440.0).round())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Activity over the last few days, newest day first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentBreakdown {
    pub days: u32,
    pub total: usize,
    pub average_per_day: f64,
    pub daily: Vec<DailyCount>,
}

/// Counts the entries of the last `days` days (`now - days ..= now`) per date.
///
/// Dates without entries are left out.
pub fn recent_breakdown(events: &[Event], now: DateTime<Utc>, days: u32) -> RecentBreakdown {
    let cutoff = now - Duration::days(i64::from(days));
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for event in events
        .iter()
        .filter(|e| cutoff <= e.occurred_at && e.occurred_at <= now)
    {
        *per_day.entry(event.occurred_at.date_naive()).or_default() += 1;
    }

    let total = per_day.values().sum();
    RecentBreakdown {
        days,
        total,
        average_per_day: round2(total as f64 / f64::from(days.max(1))),
        daily: per_day
            .into_iter()
            .rev()
            .map(|(date, count)| DailyCount { date, count })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> Event {
        Event::new(Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap())
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 20, 0, 0).unwrap()
    }

    #[test]
    fn empty_log_reports_neutral_defaults() {
        let report = summarize(&[], now()).report();
        assert_eq!(report.total, "0");
        assert_eq!(report.avg_last_30, "0.00");
        assert_eq!(report.avg_last_365, "0.00");
        assert_eq!(report.avg_lifetime, "0.00");
        assert_eq!(report.peak_slot, "-");
        assert_eq!(last_entry(&[], now()), None);
        assert_eq!(freshness(&[], now()), None);
    }

    #[test]
    fn averages_divide_by_window_length() {
        let events = [
            at(2026, 10, 19, 8, 0),
            at(2026, 9, 20, 8, 0),
            at(2026, 9, 19, 8, 0),
            at(2025, 10, 20, 8, 0),
            at(2025, 10, 19, 8, 0),
        ];
        let stats = summarize(&events, now());
        assert_eq!(stats.total, 5);
        assert!((stats.avg_last_30 - 2.0 / 30.0).abs() < 1e-12);
        assert!((stats.avg_last_365 - 4.0 / 365.0).abs() < 1e-12);
        // earliest is 365 days and 12 hours back
        assert!((stats.avg_lifetime - 5.0 / 365.0).abs() < 1e-12);
    }

    #[test]
    fn lifetime_average_never_divides_by_zero() {
        let events = [at(2026, 10, 19, 19, 0), at(2026, 10, 19, 19, 30)];
        assert_eq!(summarize(&events, now()).avg_lifetime, 2.0);
    }

    #[test]
    fn peak_hour_first_seen_wins_ties() {
        let events = [
            at(2026, 10, 18, 21, 10),
            at(2026, 10, 18, 7, 5),
            at(2026, 10, 17, 7, 55),
            at(2026, 10, 16, 21, 40),
            // outside the 30 day window
            at(2026, 8, 1, 12, 0),
            at(2026, 8, 2, 12, 0),
            at(2026, 8, 3, 12, 0),
        ];
        let stats = summarize(&events, now());
        assert_eq!(stats.peak_hour, Some(21));
        assert_eq!(stats.report().peak_slot, "21:00");
    }

    #[test]
    fn last_entry_descriptions() {
        let today = [at(2026, 10, 19, 7, 45), at(2026, 10, 1, 7, 0)];
        assert_eq!(last_entry(&today, now()).unwrap().to_string(), "Today: 07:45");

        let yesterday = [at(2026, 10, 18, 23, 5)];
        assert_eq!(
            last_entry(&yesterday, now()).unwrap().to_string(),
            "Yesterday: 23:05"
        );

        let older = [at(2026, 10, 14, 9, 30)];
        assert_eq!(
            last_entry(&older, now()).unwrap().to_string(),
            "5 days ago at 09:30"
        );
    }

    #[test]
    fn freshness_scales_units() {
        assert_eq!(freshness(&[at(2026, 10, 19, 19, 48)], now()).unwrap(), "12m");
        assert_eq!(freshness(&[at(2026, 10, 19, 16, 30)], now()).unwrap(), "3.5h");
        assert_eq!(freshness(&[at(2026, 10, 15, 20, 0)], now()).unwrap(), "4d");
    }

    #[test]
    fn recent_breakdown_groups_by_day_newest_first() {
        let events = [
            at(2026, 10, 19, 8, 0),
            at(2026, 10, 17, 8, 0),
            at(2026, 10, 17, 18, 0),
            at(2026, 10, 12, 21, 0),
            at(2026, 10, 12, 19, 0),
        ];
        let breakdown = recent_breakdown(&events, now(), 7);
        assert_eq!(breakdown.total, 4);
        assert_eq!(breakdown.average_per_day, 0.57);
        let dates: Vec<String> = breakdown.daily.iter().map(|d| d.date.to_string()).collect();
        assert_eq!(dates, vec!["2026-10-19", "2026-10-17", "2026-10-12"]);
        assert_eq!(breakdown.daily[1].count, 2);
    }
}
