use std::{env, net::SocketAddr, path::Path, path::PathBuf};

use anyhow::{Context, Result};

const DEFAULT_BIND: &str = "0.0.0.0:8000";
const DEFAULT_DATA_DIR: &str = "data";

pub struct EnvConfig {
    /// Address the HTTP server listens on
    pub bind: SocketAddr,
    /// Directory holding the event log and the dashboard settings file
    pub data_dir: PathBuf,
}

impl EnvConfig {
    pub fn load(manifest_dir: &Path) -> Result<Self> {
        #[cfg(debug_assertions)]
        if let Err(e) = dotenvy::from_path(manifest_dir.join(".env")) {
            tracing::debug!("no .env loaded: {e}");
        }
        #[cfg(not(debug_assertions))]
        let _ = manifest_dir;

        let bind = env::var("DASHBOARD_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_owned());
        let bind = bind
            .parse()
            .with_context(|| format!("DASHBOARD_BIND is not a socket address: {bind}"))?;

        let data_dir = env::var("DASHBOARD_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));

        Ok(Self { bind, data_dir })
    }
}

/// Load environment config using the calling crate's manifest directory.
#[macro_export]
macro_rules! load_env_config {
    () => {
        $crate::config::EnvConfig::load(std::path::Path::new(env!("CARGO_MANIFEST_DIR")))
    };
}
