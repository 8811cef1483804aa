use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SCOUT_HTTP_TIMEOUT_SECS must be a positive integer, got '{0}'")]
    InvalidTimeout(String),
}

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub store_path: PathBuf,
    pub portals_path: PathBuf,
    pub log_level: String,
    pub http_timeout: Duration,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let store_path = lookup("SCOUT_STORE_PATH").unwrap_or_else(|| "listings.db".into());
        let portals_path = lookup("SCOUT_PORTALS_PATH").unwrap_or_else(|| "portals.json".into());
        let log_level = lookup("SCOUT_LOG_LEVEL").unwrap_or_else(|| "info".into());

        let timeout_secs = match lookup("SCOUT_HTTP_TIMEOUT_SECS") {
            None => 30,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
        };

        Ok(Self {
            store_path: store_path.into(),
            portals_path: portals_path.into(),
            log_level,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
