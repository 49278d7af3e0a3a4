use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::StoreError;
use crate::events::{self, Event, LogRecord, STORAGE_FORMAT};
use crate::paths::EVENT_LOG_FILE;
use crate::storage;

/// The activity log: raw records on disk plus their normalised events.
///
/// Events are kept newest first.
pub struct EventStore {
    path: PathBuf,
    records: Vec<LogRecord>,
    events: Vec<Event>,
}

impl EventStore {
    /// Opens the log under `data_dir`. An unreadable log starts empty.
    pub fn open(data_dir: &Path) -> Self {
        let mut store = EventStore {
            path: data_dir.join(EVENT_LOG_FILE),
            records: Vec::new(),
            events: Vec::new(),
        };
        if let Err(e) = store.reload() {
            warn!("failed to load event log {}: {e}", store.path.display());
        }
        store
    }

    /// Re-reads the whole log from disk. State is only replaced on success.
    pub fn reload(&mut self) -> Result<(), StoreError> {
        let records: Vec<LogRecord> = storage::load_lines(&self.path)?;
        let mut events = events::normalize_records(&records);
        events.sort_by(|a, b| b.cmp(a));

        self.records = records;
        self.events = events;
        Ok(())
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Validates `user_time`, appends it to the log and reloads.
    pub fn append(&mut self, user_time: &str) -> Result<DateTime<Utc>, StoreError> {
        let timestamp = events::normalize(user_time)
            .ok_or_else(|| StoreError::InvalidTimestamp(user_time.to_owned()))?;

        let record = LogRecord {
            id: self.records.iter().map(|r| r.id).max().map_or(1, |id| id + 1),
            log_time: Some(timestamp.format(STORAGE_FORMAT).to_string()),
        };
        storage::append_line(&self.path, &record)?;
        info!(id = record.id, %timestamp, "logged entry");

        self.reload()?;
        Ok(timestamp)
    }
}
