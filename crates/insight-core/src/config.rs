//! Client configuration.
//!
//! Describes where the note-management API lives and the fixed request
//! lifecycle timings applied by the HTTP adapter.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

const ENV_BACKEND: &str = "INSIGHT_BACKEND";
const ENV_API_VERSION: &str = "INSIGHT_API_VERSION";

const DEFAULT_BACKEND: &str = "http://localhost:5000";
const DEFAULT_API_VERSION: &str = "v1";
const REQUEST_TIMEOUT_SECS: u64 = 20;
const SLOW_REQUEST_AFTER_SECS: u64 = 10;
const FORCED_LOGOUT_DELAY_MILLIS: u64 = 3_000;

/// Runtime configuration for the Insight client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend host including scheme, without trailing slash.
    pub backend_host: String,
    /// API version path segment (e.g. `v1`).
    pub api_version: String,
    /// Hard per-request timeout.
    pub request_timeout: Duration,
    /// Delay before the "taking longer than expected" advisory.
    pub slow_request_after: Duration,
    /// Delay between the token-expired notice and the session reset.
    pub forced_logout_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_host: DEFAULT_BACKEND.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            slow_request_after: Duration::from_secs(SLOW_REQUEST_AFTER_SECS),
            forced_logout_delay: Duration::from_millis(FORCED_LOGOUT_DELAY_MILLIS),
        }
    }
}

impl ClientConfig {
    /// Build a config for an explicit backend host with default timings.
    pub fn new(backend_host: impl Into<String>) -> Result<Self> {
        Ok(Self {
            backend_host: normalize_backend_host(backend_host.into())?,
            ..Self::default()
        })
    }

    /// Build a config from `INSIGHT_BACKEND` / `INSIGHT_API_VERSION`.
    ///
    /// Missing variables fall back to the local development defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_overrides(None, None)
    }

    /// Like [`ClientConfig::from_env`], but explicit values replace the
    /// matching variable before anything is validated.
    pub fn from_env_with_overrides(
        backend: Option<String>,
        api_version: Option<String>,
    ) -> Result<Self> {
        Self::layered(backend, api_version, |key| std::env::var(key).ok())
    }

    fn layered(
        backend: Option<String>,
        api_version: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        Self::from_values(
            backend.or_else(|| lookup(ENV_BACKEND)),
            api_version.or_else(|| lookup(ENV_API_VERSION)),
        )
    }

    /// Build a config from optional raw values.
    pub fn from_values(backend: Option<String>, api_version: Option<String>) -> Result<Self> {
        let mut config = match normalize_text_option(backend) {
            Some(host) => Self::new(host)?,
            None => Self::default(),
        };
        if let Some(version) = api_version {
            config = config.with_api_version(version)?;
        }
        Ok(config)
    }

    /// Override the API version segment.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Result<Self> {
        let version = normalize_text_option(Some(api_version.into()))
            .map(|value| value.trim_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                Error::InvalidConfiguration("API version must not be empty".to_string())
            })?;
        self.api_version = version;
        Ok(self)
    }

    /// Base path every request path is appended to.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("{}/api/{}", self.backend_host, self.api_version)
    }
}

fn normalize_backend_host(raw: String) -> Result<String> {
    let host = normalize_text_option(Some(raw)).ok_or_else(|| {
        Error::InvalidConfiguration("backend host must not be empty".to_string())
    })?;
    if is_http_url(&host) {
        Ok(host.trim_end_matches('/').to_string())
    } else {
        Err(Error::InvalidConfiguration(
            "backend host must include http:// or https://".to_string(),
        ))
    }
}
