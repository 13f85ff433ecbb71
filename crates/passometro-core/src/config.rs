//! Core runtime configuration.
//!
//! Resolved once at process startup and passed into core services. Nothing in this crate reads
//! environment variables; binaries read them and hand the raw values to the `*_from_env_value`
//! helpers below.

use crate::constants::{DEFAULT_BACKEND_URL, DEFAULT_DATA_DIR, DEFAULT_TIMEOUT_SECS};
use crate::{HandoffError, HandoffResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    backend_url: Option<String>,
    request_timeout: Duration,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `backend_url` of `None` runs offline: generation is unavailable and the sheet is kept only
    /// in the local store.
    pub fn new(
        data_dir: PathBuf,
        backend_url: Option<String>,
        request_timeout: Duration,
    ) -> HandoffResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(HandoffError::InvalidConfig("data_dir cannot be empty".into()));
        }

        let backend_url = backend_url
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
        if let Some(url) = &backend_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(HandoffError::InvalidConfig(format!(
                    "backend url must start with http:// or https://, got {url}"
                )));
            }
        }

        if request_timeout.is_zero() {
            return Err(HandoffError::InvalidConfig(
                "request timeout must be greater than zero".into(),
            ));
        }

        Ok(Self {
            data_dir,
            backend_url,
            request_timeout,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn backend_url(&self) -> Option<&str> {
        self.backend_url.as_deref()
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            backend_url: Some(DEFAULT_BACKEND_URL.to_string()),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Data directory from an optional value, falling back to [`DEFAULT_DATA_DIR`].
pub fn data_dir_from_env_value(value: Option<String>) -> PathBuf {
    non_empty(value)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Backend URL from an optional value.
///
/// Unset or blank yields the default service. `off` or `none` (any case) disables the backend.
pub fn backend_url_from_env_value(value: Option<String>) -> Option<String> {
    match non_empty(value) {
        None => Some(DEFAULT_BACKEND_URL.to_string()),
        Some(v) if v.eq_ignore_ascii_case("off") || v.eq_ignore_ascii_case("none") => None,
        Some(v) => Some(v),
    }
}

/// Request timeout in seconds from an optional value.
///
/// If `value` is `None` or blank, returns [`DEFAULT_TIMEOUT_SECS`].
pub fn timeout_from_env_value(value: Option<String>) -> HandoffResult<Duration> {
    let Some(raw) = non_empty(value) else {
        return Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    };
    raw.parse::<u64>().map(Duration::from_secs).map_err(|_| {
        HandoffError::InvalidConfig(format!("timeout must be a whole number of seconds, got {raw}"))
    })
}
