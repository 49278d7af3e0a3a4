use std::path::Path;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};

use crate::dashboard_config::DashboardConfig;
use crate::events::Event;
use crate::store::EventStore;

pub struct AppState {
    pub store: RwLock<EventStore>,
    pub config: DashboardConfig,
}

impl AppState {
    pub fn new(data_dir: &Path, config: DashboardConfig) -> Self {
        AppState {
            store: RwLock::new(EventStore::open(data_dir)),
            config,
        }
    }

    /// Copies the current events out so rendering runs without holding the lock.
    pub fn snapshot(&self) -> Vec<Event> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store.events().to_vec()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.config.clock.now()
    }
}
