//! Layered settings.
//!
//! Three layers, in priority order: compiled defaults, an optional JSON
//! settings file merged over them, and `PLAYSYNC_*` environment variables
//! on top. Loading never fails the caller — a bad file or variable is
//! logged and the lower layer wins.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use url::Url;

/// Settings load/parse errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    /// The settings file is not valid JSON for this schema.
    #[error("failed to parse settings file: {0}")]
    Parse(#[from] serde_json::Error),
    /// The configured SSE endpoint is not an absolute URL.
    #[error("invalid sse endpoint {endpoint:?}: {source}")]
    InvalidEndpoint {
        /// The offending value.
        endpoint: String,
        /// Underlying parse error.
        source: url::ParseError,
    },
}

/// Coordinator configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Absolute URL of the server-sent-events endpoint.
    pub sse_endpoint: String,
    /// Per-request watchdog duration in whole seconds.
    pub request_timeout_secs: u64,
    /// Element given a derived refresh on tracklist changes (the blurred
    /// artwork backdrop), if the view has one.
    pub backdrop_element: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sse_endpoint: "http://127.0.0.1:9888/sse".into(),
            request_timeout_secs: 30,
            backdrop_element: Some("#backdrop".into()),
        }
    }
}

impl Settings {
    /// Load settings: defaults, then the file at `path` (when given), then
    /// env overrides. Failures fall back to the lower layer with a
    /// warning.
    pub fn load(path: Option<&Path>) -> Self {
        let mut settings = match path {
            Some(path) => Self::load_from_path(path).unwrap_or_else(|e| {
                warn!(error = %e, ?path, "failed to load settings file, using defaults");
                Self::default()
            }),
            None => Self::default(),
        };
        settings.apply_env_overrides();
        settings
    }

    /// Parse the file at `path` over the compiled defaults.
    pub fn load_from_path(path: &Path) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// The watchdog duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The SSE endpoint as a parsed URL.
    pub fn sse_url(&self) -> Result<Url, SettingsError> {
        Url::parse(&self.sse_endpoint).map_err(|source| SettingsError::InvalidEndpoint {
            endpoint: self.sse_endpoint.clone(),
            source,
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = std::env::var("PLAYSYNC_SSE_ENDPOINT")
            && !endpoint.is_empty()
        {
            self.sse_endpoint = endpoint;
        }
        if let Ok(raw) = std::env::var("PLAYSYNC_REQUEST_TIMEOUT_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => self.request_timeout_secs = secs,
                _ => warn!(%raw, "ignoring invalid PLAYSYNC_REQUEST_TIMEOUT_SECS"),
            }
        }
    }
}
