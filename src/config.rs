//! Client configuration loaded from the environment

use std::{env, time::Duration};

use tracing::{debug, warn};
use url::Url;

use crate::error::{AppError, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:5118";
pub const DEFAULT_POLL_SECS: u64 = 5;
pub const DEFAULT_DATABASE_URL: &str = "sqlite:solidario.db?mode=rwc";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the platform backend
    pub api_url: Url,
    /// Interval between chat polls
    pub poll_interval: Duration,
    /// Where the session tokens are persisted
    pub database_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("Default API URL misconfigured!"),
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECS),
            database_url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Load from `SOLIDARIO_API_URL`, `SOLIDARIO_POLL_SECS` and
    /// `SOLIDARIO_DATABASE_URL`, falling back to defaults for unset keys.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = var(&lookup, "SOLIDARIO_API_URL", DEFAULT_API_URL);
        let poll_secs = var(&lookup, "SOLIDARIO_POLL_SECS", &DEFAULT_POLL_SECS.to_string());
        let database_url = var(&lookup, "SOLIDARIO_DATABASE_URL", DEFAULT_DATABASE_URL);

        Ok(Self {
            api_url: parse_api_url(&api_url)?,
            poll_interval: parse_poll_secs(&poll_secs)?,
            database_url,
        })
    }

    pub fn with_api_url(mut self, api_url: &str) -> Result<Self> {
        self.api_url = parse_api_url(api_url)?;
        Ok(self)
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_database_url(mut self, database_url: impl Into<String>) -> Self {
        self.database_url = database_url.into();
        self
    }
}

fn var<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| {
        debug!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn parse_api_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| {
        warn!("Invalid API URL {raw}: {e}");
        AppError::Config(format!("invalid API URL '{}': {}", raw, e))
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::Config(format!(
            "unsupported API URL scheme: {}",
            other
        ))),
    }
}

fn parse_poll_secs(raw: &str) -> Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|e| AppError::Config(format!("invalid poll interval '{}': {}", raw, e)))?;

    if secs == 0 {
        return Err(AppError::Config("poll interval must be positive".to_string()));
    }

    Ok(Duration::from_secs(secs))
}
