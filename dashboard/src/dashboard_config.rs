use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::charts::ChartView;
use crate::paths::SETTINGS_FILE;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub title: String,
    pub default_view: ChartView,
    pub clock: ClockMode,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            title: "Activity log".to_owned(),
            default_view: ChartView::Rolling30,
            clock: ClockMode::Utc,
        }
    }
}

/// Where "now" comes from.
///
/// Stored timestamps are wall-clock fields read as UTC. `Utc` compares them
/// against the real UTC time; `Local` reads the host's local wall clock the same
/// way, which matches logs written in local time.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClockMode {
    Utc,
    Local,
}

impl ClockMode {
    pub fn now(self) -> DateTime<Utc> {
        match self {
            ClockMode::Utc => Utc::now(),
            ClockMode::Local => Local::now().naive_local().and_utc(),
        }
    }
}

/// Loads `dashboard.toml` from `data_dir`. Returns `DashboardConfig::default()` if
/// the file doesn't exist; propagates other I/O and parse errors.
pub fn load(data_dir: &Path) -> io::Result<DashboardConfig> {
    let path = data_dir.join(SETTINGS_FILE);
    match fs::read_to_string(&path) {
        Ok(content) => {
            toml::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(DashboardConfig::default()),
        Err(e) => Err(e),
    }
}
