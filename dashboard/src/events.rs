//! Log records and their normalisation into absolute instants.
//!
//! Records carry wall-clock timestamps with no zone. Normalising keeps those
//! wall-clock fields and reads them as UTC, so every day/month/year boundary
//! downstream is computed in one calendar.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Layout written by the submission endpoints and the on-disk log.
pub const STORAGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Layout of the `user_time` field sent by the entry form.
pub const FORM_FORMAT: &str = "%Y-%m-%dT%H:%M";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    FORM_FORMAT,
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// One persisted line of the event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: u64,
    #[serde(default)]
    pub log_time: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Event {
    pub occurred_at: DateTime<Utc>,
}

impl Event {
    pub fn new(occurred_at: DateTime<Utc>) -> Self {
        Event { occurred_at }
    }
}

/// Parses a raw timestamp and re-anchors its wall-clock fields onto UTC.
///
/// An RFC 3339 offset is dropped rather than applied.
pub fn normalize(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.naive_local().and_utc());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Normalises every record, dropping the ones without a usable timestamp.
///
/// Input order is kept.
pub fn normalize_records(records: &[LogRecord]) -> Vec<Event> {
    records
        .iter()
        .filter_map(|record| {
            let Some(raw) = record.log_time.as_deref() else {
                debug!(id = record.id, "dropping record without log_time");
                return None;
            };
            let parsed = normalize(raw);
            if parsed.is_none() {
                debug!(id = record.id, raw, "dropping record with unparsable log_time");
            }
            parsed.map(Event::new)
        })
        .collect()
}
