//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const API_URL_VAR: &str = "SHORTLINK_API_URL";
const TIMEOUT_VAR: &str = "SHORTLINK_REQUEST_TIMEOUT_SECS";

/// Errors produced while building a [`ClientConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The API base URL resolved to an empty string.
    #[error("SHORTLINK_API_URL must not be empty")]
    EmptyBaseUrl,

    /// The timeout variable was set but is not a positive integer.
    #[error("invalid SHORTLINK_REQUEST_TIMEOUT_SECS: {value}")]
    InvalidTimeout { value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base, without a trailing slash. May be relative (`/api`) in the
    /// browser; native hosts need an absolute URL.
    pub api_base_url: String,
    /// Per-request timeout. Ignored on `wasm32`, where fetch has no timeout knob.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: normalize_base_url(&api_base_url.into()),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Build config from the process environment.
    ///
    /// - `SHORTLINK_API_URL`: run-time value, else the value baked in at
    ///   compile time, else `/api`
    /// - `SHORTLINK_REQUEST_TIMEOUT_SECS`: default 30
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is blank or the timeout is not a
    /// positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ClientConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup(API_URL_VAR)
            .or_else(|| option_env!("SHORTLINK_API_URL").map(str::to_owned))
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned());
        let api_base_url = normalize_base_url(&raw_url);
        if api_base_url.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }

        let request_timeout = match lookup(TIMEOUT_VAR) {
            Some(value) => parse_timeout(&value)?,
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        Ok(Self { api_base_url, request_timeout })
    }

    /// Resolve a relative base URL (`/api`) against a page origin.
    ///
    /// Absolute base URLs are returned unchanged; an unparseable origin leaves
    /// the base as it was.
    #[must_use]
    pub fn resolve_against(mut self, origin: &str) -> Self {
        if Url::parse(&self.api_base_url).is_ok() {
            return self;
        }
        match Url::parse(origin).and_then(|o| o.join(&self.api_base_url)) {
            Ok(resolved) => self.api_base_url = normalize_base_url(resolved.as_str()),
            Err(err) => log::warn!("config: cannot resolve {} against {origin}: {err}", self.api_base_url),
        }
        self
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout { value: value.to_owned() }),
    }
}
