pub mod smoothing;
pub mod svg;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::{self, PeriodKind};
use crate::error::ChartError;
use crate::events::Event;

use self::smoothing::moving_average;

/// Number of 15-minute slots in a day.
pub const QUARTER_HOURS_PER_DAY: usize = 96;

/// Chart views offered by the dashboard.
///
/// Only the two day-by-day views can page back through calendar periods; the
/// aggregate views and the time-of-day histogram always cover the whole log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartView {
    #[serde(rename = "last30")]
    Rolling30,
    #[serde(rename = "last365")]
    Rolling365,
    #[serde(rename = "monthly")]
    MonthlyAggregate,
    #[serde(rename = "yearly")]
    YearlyAggregate,
    #[serde(rename = "time_of_day")]
    QuarterHourHistogram,
}

impl ChartView {
    pub const ALL: [ChartView; 5] = [
        ChartView::Rolling30,
        ChartView::Rolling365,
        ChartView::MonthlyAggregate,
        ChartView::YearlyAggregate,
        ChartView::QuarterHourHistogram,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ChartView::Rolling30 => "last30",
            ChartView::Rolling365 => "last365",
            ChartView::MonthlyAggregate => "monthly",
            ChartView::YearlyAggregate => "yearly",
            ChartView::QuarterHourHistogram => "time_of_day",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ChartView::Rolling30 => "Last 30 days",
            ChartView::Rolling365 => "Last year",
            ChartView::MonthlyAggregate => "Monthly average",
            ChartView::YearlyAggregate => "Yearly average",
            ChartView::QuarterHourHistogram => "Time of day",
        }
    }

    pub fn is_navigable(self) -> bool {
        matches!(self, ChartView::Rolling30 | ChartView::Rolling365)
    }

    /// Whether the view plots per-day rates instead of raw counts.
    pub fn is_rate_only(self) -> bool {
        matches!(
            self,
            ChartView::MonthlyAggregate | ChartView::YearlyAggregate
        )
    }

    pub fn smoothing_window(self) -> usize {
        match self {
            ChartView::Rolling30 => 3,
            ChartView::Rolling365 => 7,
            ChartView::MonthlyAggregate | ChartView::YearlyAggregate => 1,
            ChartView::QuarterHourHistogram => 2,
        }
    }
}

impl FromStr for ChartView {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartView::ALL
            .into_iter()
            .find(|view| view.id() == s)
            .ok_or_else(|| ChartError::InvalidView(s.to_owned()))
    }
}

impl fmt::Display for ChartView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Title of a computed series, kept as data so callers can localise it.
///
/// `Display` gives the default English text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "key", rename_all = "snake_case")]
pub enum Caption {
    DateRange { start: NaiveDate, end: NaiveDate },
    Month { year: i32, month: u32 },
    #[serde(rename = "trailing_365")]
    Trailing365,
    Year { year: i32 },
    HistoricalAverage,
    TimeOfDay,
}

impl Caption {
    pub fn key(&self) -> &'static str {
        match self {
            Caption::DateRange { .. } => "date_range",
            Caption::Month { .. } => "month",
            Caption::Trailing365 => "trailing_365",
            Caption::Year { .. } => "year",
            Caption::HistoricalAverage => "historical_average",
            Caption::TimeOfDay => "time_of_day",
        }
    }
}

impl fmt::Display for Caption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Caption::DateRange { start, end } => {
                write!(f, "{} - {}", start.format("%-d %b"), end.format("%-d %b"))
            }
            Caption::Month { year, month } => match calendar::first_of_month(*year, *month) {
                Some(first) => write!(f, "{}", first.format("%B %Y")),
                None => write!(f, "{year}-{month:02}"),
            },
            Caption::Trailing365 => f.write_str("Last 365 days"),
            Caption::Year { year } => write!(f, "Year {year}"),
            Caption::HistoricalAverage => f.write_str("History (average per day)"),
            Caption::TimeOfDay => f.write_str("Time of day (15 min)"),
        }
    }
}

/// One aggregation unit covering `start..end` (end exclusive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub key: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Output of one recompute, ready for a render sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesResult {
    pub view: ChartView,
    pub offset: u32,
    pub labels: Vec<String>,
    /// Per-bucket counts. Empty for the rate-only aggregate views.
    pub raw: Vec<f64>,
    pub smooth: Vec<f64>,
    pub caption: Caption,
    pub navigable: bool,
}

/// Buckets `events` for `view`, `offset` periods back from the one containing `now`.
///
/// The offset is ignored for views that are not navigable. Fails only when the
/// requested period falls outside the representable calendar.
pub fn compute(
    view: ChartView,
    offset: u32,
    events: &[Event],
    now: DateTime<Utc>,
) -> Result<SeriesResult, ChartError> {
    let offset = if view.is_navigable() { offset } else { 0 };
    let today = now.date_naive();

    let (buckets, caption) = match view {
        ChartView::Rolling30 => rolling_30_period(offset, today)?,
        ChartView::Rolling365 => rolling_365_period(offset, today)?,
        ChartView::MonthlyAggregate => (month_buckets(events), Caption::HistoricalAverage),
        ChartView::YearlyAggregate => (year_buckets(events), Caption::HistoricalAverage),
        ChartView::QuarterHourHistogram => (quarter_hour_buckets(), Caption::TimeOfDay),
    };

    let counts = match view {
        ChartView::QuarterHourHistogram => tally(
            &buckets,
            events.iter().map(|e| fold_onto_anchor(e.occurred_at)),
        ),
        _ => tally(&buckets, events.iter().map(|e| e.occurred_at.naive_utc())),
    };

    let (raw, trend_input) = match view {
        ChartView::MonthlyAggregate => (
            Vec::new(),
            rates(&buckets, &counts, PeriodKind::Month, now),
        ),
        ChartView::YearlyAggregate => (
            Vec::new(),
            rates(&buckets, &counts, PeriodKind::Year, now),
        ),
        _ => {
            let raw: Vec<f64> = counts.iter().map(|c| f64::from(*c)).collect();
            (raw.clone(), raw)
        }
    };
    let smooth = moving_average(&trend_input, view.smoothing_window());

    Ok(SeriesResult {
        view,
        offset,
        labels: buckets.into_iter().map(|b| b.key).collect(),
        raw,
        smooth,
        caption,
        navigable: view.is_navigable(),
    })
}

fn out_of_range(offset: u32) -> ChartError {
    ChartError::OffsetOutOfRange(offset)
}

fn rolling_30_period(offset: u32, today: NaiveDate) -> Result<(Vec<Bucket>, Caption), ChartError> {
    if offset == 0 {
        let start = today
            .checked_sub_days(Days::new(29))
            .ok_or_else(|| out_of_range(offset))?;
        return Ok((
            day_buckets(start, today),
            Caption::DateRange { start, end: today },
        ));
    }

    let (year, month) = calendar::months_back(today.year(), today.month(), offset)
        .ok_or_else(|| out_of_range(offset))?;
    let first = calendar::first_of_month(year, month).ok_or_else(|| out_of_range(offset))?;
    let last = first
        .checked_add_days(Days::new(u64::from(calendar::days_in_month(year, month)) - 1))
        .ok_or_else(|| out_of_range(offset))?;
    Ok((day_buckets(first, last), Caption::Month { year, month }))
}

fn rolling_365_period(offset: u32, today: NaiveDate) -> Result<(Vec<Bucket>, Caption), ChartError> {
    if offset == 0 {
        let start = today
            .checked_sub_days(Days::new(364))
            .ok_or_else(|| out_of_range(offset))?;
        return Ok((day_buckets(start, today), Caption::Trailing365));
    }

    let year = i32::try_from(i64::from(today.year()) - i64::from(offset))
        .map_err(|_| out_of_range(offset))?;
    let first = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| out_of_range(offset))?;
    let last = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(|| out_of_range(offset))?;
    Ok((day_buckets(first, last), Caption::Year { year }))
}

/// One bucket per calendar day from `first` through `last`, both included.
pub fn day_buckets(first: NaiveDate, last: NaiveDate) -> Vec<Bucket> {
    first
        .iter_days()
        .take_while(|day| *day <= last)
        .filter_map(|day| {
            let next = day.succ_opt()?;
            Some(Bucket {
                key: day.format("%Y-%m-%d").to_string(),
                start: day.and_time(NaiveTime::MIN),
                end: next.and_time(NaiveTime::MIN),
            })
        })
        .collect()
}

/// Month buckets spanning the earliest to the latest event.
///
/// Months without events between the two are included with a zero rate, so
/// the series has no gaps even though such months were never logged.
fn month_buckets(events: &[Event]) -> Vec<Bucket> {
    let Some((earliest, latest)) = event_span(events) else {
        return Vec::new();
    };

    let mut buckets = Vec::new();
    let (mut year, mut month) = (earliest.year(), earliest.month());
    while (year, month) <= (latest.year(), latest.month()) {
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let (Some(first), Some(next)) = (
            calendar::first_of_month(year, month),
            calendar::first_of_month(next_year, next_month),
        ) else {
            break;
        };
        buckets.push(Bucket {
            key: first.format("%Y-%m").to_string(),
            start: first.and_time(NaiveTime::MIN),
            end: next.and_time(NaiveTime::MIN),
        });
        (year, month) = (next_year, next_month);
    }
    buckets
}

/// Year buckets spanning the earliest to the latest event. Years without
/// events in between are kept at zero, as for months.
fn year_buckets(events: &[Event]) -> Vec<Bucket> {
    let Some((earliest, latest)) = event_span(events) else {
        return Vec::new();
    };

    (earliest.year()..=latest.year())
        .filter_map(|year| {
            let first = NaiveDate::from_ymd_opt(year, 1, 1)?;
            let next = NaiveDate::from_ymd_opt(year + 1, 1, 1)?;
            Some(Bucket {
                key: format!("{year:04}"),
                start: first.and_time(NaiveTime::MIN),
                end: next.and_time(NaiveTime::MIN),
            })
        })
        .collect()
}

/// The 96 quarter-hour slots of a day, keyed `HH:MM`.
///
/// Slots sit on [`SLOT_ANCHOR`] since the event date is discarded.
pub fn quarter_hour_buckets() -> Vec<Bucket> {
    (0..QUARTER_HOURS_PER_DAY as u32)
        .filter_map(|slot| {
            let start = NaiveTime::from_hms_opt(slot / 4, (slot % 4) * 15, 0)?;
            let end = SLOT_ANCHOR.and_time(start) + chrono::Duration::minutes(15);
            Some(Bucket {
                key: start.format("%H:%M").to_string(),
                start: SLOT_ANCHOR.and_time(start),
                end,
            })
        })
        .collect()
}

/// Reference day the time-of-day histogram folds every event onto.
pub const SLOT_ANCHOR: NaiveDate = NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid anchor date");

fn fold_onto_anchor(ts: DateTime<Utc>) -> NaiveDateTime {
    SLOT_ANCHOR.and_time(ts.time())
}

fn event_span(events: &[Event]) -> Option<(NaiveDate, NaiveDate)> {
    let earliest = events.iter().map(|e| e.occurred_at).min()?;
    let latest = events.iter().map(|e| e.occurred_at).max()?;
    Some((earliest.date_naive(), latest.date_naive()))
}

/// Counts how many instants fall in each of the sorted, non-overlapping `buckets`.
///
/// Instants outside every bucket are ignored.
pub fn tally(buckets: &[Bucket], instants: impl Iterator<Item = NaiveDateTime>) -> Vec<u32> {
    let mut counts = vec![0u32; buckets.len()];
    for ts in instants {
        let idx = buckets.partition_point(|b| b.start <= ts);
        if idx == 0 {
            continue;
        }
        if ts < buckets[idx - 1].end {
            counts[idx - 1] += 1;
        }
    }
    counts
}

/// Per-day rates for calendar buckets, rounded to two decimals.
fn rates(buckets: &[Bucket], counts: &[u32], kind: PeriodKind, now: DateTime<Utc>) -> Vec<f64> {
    buckets
        .iter()
        .zip(counts)
        .map(|(bucket, count)| {
            let days = calendar::units_elapsed(bucket.start.date(), kind, now).max(1);
            round2(f64::from(*count) / f64::from(days))
        })
        .collect()
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> Event {
        Event::new(Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap())
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 18, 30, 0).unwrap()
    }

    fn assert_contiguous_days(labels: &[String]) {
        let days: Vec<NaiveDate> = labels
            .iter()
            .map(|l| NaiveDate::parse_from_str(l, "%Y-%m-%d").unwrap())
            .collect();
        for pair in days.windows(2) {
            assert_eq!(pair[0].succ_opt().unwrap(), pair[1]);
        }
    }

    #[test]
    fn view_ids_round_trip_and_unknown_ids_fail() {
        for view in ChartView::ALL {
            assert_eq!(view.id().parse::<ChartView>().unwrap(), view);
        }
        assert!(matches!(
            "weekly".parse::<ChartView>(),
            Err(ChartError::InvalidView(id)) if id == "weekly"
        ));
    }

    #[test]
    fn rolling_30_covers_trailing_window_inclusive() {
        let events = [
            at(2026, 9, 20, 0, 0),
            at(2026, 9, 19, 23, 59),
            at(2026, 10, 19, 23, 59),
            at(2026, 10, 20, 0, 0),
        ];
        let series = compute(ChartView::Rolling30, 0, &events, now()).unwrap();

        assert_eq!(series.labels.len(), 30);
        assert_eq!(series.labels.first().unwrap(), "2026-09-20");
        assert_eq!(series.labels.last().unwrap(), "2026-10-19");
        assert_eq!(series.raw.len(), 30);
        assert_eq!(series.smooth.len(), 30);
        assert_eq!(series.raw[0], 1.0);
        assert_eq!(series.raw[29], 1.0);
        assert_eq!(series.raw.iter().sum::<f64>(), 2.0);
        assert!(series.navigable);
        assert_eq!(
            series.caption,
            Caption::DateRange {
                start: NaiveDate::from_ymd_opt(2026, 9, 20).unwrap(),
                end: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            }
        );
        assert_contiguous_days(&series.labels);
    }

    #[test]
    fn rolling_30_leading_spike_smooths_with_window_three() {
        let events = [at(2026, 9, 20, 8, 0)];
        let series = compute(ChartView::Rolling30, 0, &events, now()).unwrap();

        assert_eq!(series.raw[0], 1.0);
        assert!(series.raw[1..].iter().all(|v| *v == 0.0));
        assert_eq!(series.smooth[0], 1.0);
        assert_eq!(series.smooth[1], 0.5);
        assert!((series.smooth[2] - 0.333).abs() < 1e-3);
        assert!(series.smooth[3..].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn rolling_365_leading_spike_smooths_with_window_seven() {
        let events = [at(2025, 10, 20, 8, 0)];
        let series = compute(ChartView::Rolling365, 0, &events, now()).unwrap();

        assert_eq!(series.labels[0], "2025-10-20");
        assert_eq!(series.raw[0], 1.0);
        for (i, value) in series.smooth[..7].iter().enumerate() {
            assert!((value - 1.0 / (i + 1) as f64).abs() < 1e-9, "smooth[{i}] = {value}");
        }
        assert!(series.smooth[7..].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn histogram_smooths_adjacent_slot_pairs() {
        let events = [at(2026, 10, 18, 9, 7)];
        let series = compute(ChartView::QuarterHourHistogram, 0, &events, now()).unwrap();
        let slot = series.labels.iter().position(|l| l == "09:00").unwrap();

        assert_eq!(series.raw[slot], 1.0);
        assert_eq!(series.smooth[slot - 1], 0.0);
        assert_eq!(series.smooth[slot], 0.5);
        assert_eq!(series.smooth[slot + 1], 0.5);
        assert_eq!(series.smooth[slot + 2], 0.0);
    }

    #[test]
    fn rolling_30_offsets_page_through_calendar_months() {
        let september = compute(ChartView::Rolling30, 1, &[], now()).unwrap();
        assert_eq!(september.labels.len(), 30);
        assert_eq!(september.labels[0], "2026-09-01");
        assert_eq!(september.caption, Caption::Month { year: 2026, month: 9 });
        assert_eq!(september.caption.to_string(), "September 2026");

        let february = compute(ChartView::Rolling30, 20, &[], now()).unwrap();
        assert_eq!(february.caption, Caption::Month { year: 2025, month: 2 });
        assert_eq!(february.labels.len(), 28);
        assert_eq!(february.labels.last().unwrap(), "2025-02-28");
    }

    #[test]
    fn rolling_365_trailing_and_calendar_years() {
        let trailing = compute(ChartView::Rolling365, 0, &[], now()).unwrap();
        assert_eq!(trailing.labels.len(), 365);
        assert_eq!(trailing.labels.last().unwrap(), "2026-10-19");
        assert_eq!(trailing.caption, Caption::Trailing365);
        assert_contiguous_days(&trailing.labels);

        let leap = compute(ChartView::Rolling365, 2, &[at(2024, 2, 29, 12, 0)], now()).unwrap();
        assert_eq!(leap.labels.len(), 366);
        assert_eq!(leap.labels[0], "2024-01-01");
        assert_eq!(leap.caption.to_string(), "Year 2024");
        assert_eq!(leap.raw[59], 1.0);
        assert_eq!(leap.raw.len(), leap.labels.len());
    }

    #[test]
    fn monthly_rate_divides_in_progress_month_by_days_so_far() {
        let events = [
            at(2026, 10, 1, 9, 0),
            at(2026, 10, 4, 9, 0),
            at(2026, 10, 9, 9, 0),
        ];
        let day_ten = Utc.with_ymd_and_hms(2026, 10, 10, 12, 0, 0).unwrap();
        let series = compute(ChartView::MonthlyAggregate, 0, &events, day_ten).unwrap();

        assert_eq!(series.labels, vec!["2026-10"]);
        assert_eq!(series.smooth, vec![0.3]);
        assert_ne!(series.smooth[0], round2(3.0 / 31.0));
        assert!(series.raw.is_empty());
        assert!(!series.navigable);
    }

    #[test]
    fn monthly_fills_gap_months_and_sorts_keys() {
        let events = [at(2026, 8, 2, 9, 0), at(2026, 5, 31, 23, 0), at(2026, 5, 1, 0, 0)];
        let series = compute(ChartView::MonthlyAggregate, 0, &events, now()).unwrap();

        assert_eq!(series.labels, vec!["2026-05", "2026-06", "2026-07", "2026-08"]);
        assert_eq!(series.smooth, vec![0.06, 0.0, 0.0, 0.03]);
        assert_eq!(series.caption, Caption::HistoricalAverage);
    }

    #[test]
    fn yearly_rate_uses_day_of_year_for_current_year() {
        let events = [at(2025, 3, 1, 9, 0), at(2026, 1, 5, 9, 0), at(2026, 2, 5, 9, 0)];
        let series = compute(ChartView::YearlyAggregate, 0, &events, now()).unwrap();

        assert_eq!(series.labels, vec!["2025", "2026"]);
        // 2026-10-19 is day 292
        assert_eq!(series.smooth, vec![round2(1.0 / 365.0), round2(2.0 / 292.0)]);
        assert!(series.raw.is_empty());
    }

    #[test]
    fn histogram_folds_events_onto_quarter_hours() {
        let events = [
            at(2026, 1, 1, 9, 7),
            at(2025, 7, 3, 9, 16),
            at(2024, 2, 29, 23, 59),
            at(2026, 10, 19, 0, 0),
        ];
        let series = compute(ChartView::QuarterHourHistogram, 3, &events, now()).unwrap();

        assert_eq!(series.labels.len(), QUARTER_HOURS_PER_DAY);
        assert_eq!(series.labels[0], "00:00");
        assert_eq!(series.labels[95], "23:45");
        let slot = |key: &str| series.labels.iter().position(|l| l == key).unwrap();
        assert_eq!(series.raw[slot("09:00")], 1.0);
        assert_eq!(series.raw[slot("09:15")], 1.0);
        assert_eq!(series.raw[slot("23:45")], 1.0);
        assert_eq!(series.raw[slot("00:00")], 1.0);
        assert_eq!(series.offset, 0);
        assert!(!series.navigable);
    }

    #[test]
    fn empty_log_still_zero_fills_periods() {
        for view in [ChartView::Rolling30, ChartView::Rolling365, ChartView::QuarterHourHistogram] {
            let series = compute(view, 0, &[], now()).unwrap();
            assert!(!series.labels.is_empty());
            assert_eq!(series.labels.len(), series.raw.len());
            assert!(series.raw.iter().all(|v| *v == 0.0));
        }
        for view in [ChartView::MonthlyAggregate, ChartView::YearlyAggregate] {
            let series = compute(view, 0, &[], now()).unwrap();
            assert!(series.labels.is_empty());
            assert!(series.smooth.is_empty());
        }
    }

    #[test]
    fn absurd_offsets_are_rejected() {
        assert!(matches!(
            compute(ChartView::Rolling365, u32::MAX, &[], now()),
            Err(ChartError::OffsetOutOfRange(_))
        ));
        assert!(compute(ChartView::Rolling30, u32::MAX, &[], now()).is_err());
    }

    #[test]
    fn tally_skips_instants_outside_buckets() {
        let buckets = day_buckets(
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
        );
        let instants = [
            at(2025, 12, 31, 23, 59).occurred_at.naive_utc(),
            at(2026, 1, 2, 0, 0).occurred_at.naive_utc(),
            at(2026, 1, 3, 0, 0).occurred_at.naive_utc(),
        ];
        assert_eq!(tally(&buckets, instants.into_iter()), vec![0, 1]);
    }
}
