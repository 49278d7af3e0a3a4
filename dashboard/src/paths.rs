//! File names inside the data directory.

pub const EVENT_LOG_FILE: &str = "events.jsonl";
pub const SETTINGS_FILE: &str = "dashboard.toml";
