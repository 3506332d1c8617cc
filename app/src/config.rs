//! Configuration management for the Eventos client.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Call `dotenvy::dotenv()` first to pick up a `.env` file.

use eventos_data::BackendConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which event repository to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process lists seeded with the demo events.
    Local,
    /// The hosted document store.
    Remote,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            other => Err(format!("unknown backend '{other}', expected 'local' or 'remote'")),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// `EVENTOS_BACKEND` (default: remote)
    pub backend: BackendKind,
    /// `EVENTOS_PROJECT_ID`, used in setup links (default: eventos-demo)
    pub project_id: String,
    /// `EVENTOS_PROFILE_WRITE_TIMEOUT_MS` (default: 3000)
    pub profile_write_timeout_ms: u64,
    /// `EVENTOS_INCLUDE_SAMPLE_EVENTS`: merge demo events into non-empty
    /// results (default: true)
    pub include_sample_events: bool,
}

impl Config {
    /// Load configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            backend: lookup("EVENTOS_BACKEND")
                .and_then(|s| s.parse().ok())
                .unwrap_or(BackendKind::Remote),
            project_id: lookup("EVENTOS_PROJECT_ID").unwrap_or_else(|| "eventos-demo".to_string()),
            profile_write_timeout_ms: lookup("EVENTOS_PROFILE_WRITE_TIMEOUT_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            include_sample_events: lookup("EVENTOS_INCLUDE_SAMPLE_EVENTS")
                .and_then(|s| parse_flag(&s))
                .unwrap_or(true),
        }
    }

    /// Settings for the data layer.
    #[must_use]
    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig::new(self.project_id.clone())
            .with_profile_write_timeout(Duration::from_millis(self.profile_write_timeout_ms))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
