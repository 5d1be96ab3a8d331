//! Runtime settings for a store instance, read from the environment.

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidVar { var: &'static str, value: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Root of the REST resource, e.g. `http://localhost:8080/api/v1`.
    pub base_url: String,
    /// Per-request timeout. `None` keeps the transport default.
    pub request_timeout: Option<Duration>,
    /// Extra attempts after a transport failure on an idempotent request.
    pub transport_retries: u32,
    /// Age after which a cached view is refetched even without a mutation.
    /// `None` means cached data stays fresh until invalidated.
    pub stale_after: Option<Duration>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: None,
            transport_retries: 0,
            stale_after: None,
        }
    }
}

impl SyncConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Reads `TODO_API_URL`, `TODO_API_TIMEOUT_MS`, `TODO_API_RETRIES` and
    /// `TODO_CACHE_STALE_MS`. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = lookup("TODO_API_URL") {
            config.base_url = url;
        }
        if let Some(raw) = lookup("TODO_API_TIMEOUT_MS") {
            config.request_timeout = Some(Duration::from_millis(parse_var("TODO_API_TIMEOUT_MS", raw)?));
        }
        if let Some(raw) = lookup("TODO_API_RETRIES") {
            config.transport_retries = parse_var("TODO_API_RETRIES", raw)?;
        }
        if let Some(raw) = lookup("TODO_CACHE_STALE_MS") {
            config.stale_after = Some(Duration::from_millis(parse_var("TODO_CACHE_STALE_MS", raw)?));
        }
        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidVar { var, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = SyncConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, SyncConfig::default());
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.transport_retries, 0);
    }

    #[test]
    fn reads_every_variable() {
        let config = SyncConfig::from_lookup(lookup(&[
            ("TODO_API_URL", "http://api.local/api/v1"),
            ("TODO_API_TIMEOUT_MS", "1500"),
            ("TODO_API_RETRIES", "1"),
            ("TODO_CACHE_STALE_MS", "30000"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://api.local/api/v1");
        assert_eq!(config.request_timeout, Some(Duration::from_millis(1500)));
        assert_eq!(config.transport_retries, 1);
        assert_eq!(config.stale_after, Some(Duration::from_secs(30)));
    }

    #[test]
    fn rejects_non_numeric_retries() {
        let err = SyncConfig::from_lookup(lookup(&[("TODO_API_RETRIES", "many")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidVar {
                var: "TODO_API_RETRIES",
                ..
            }
        ));
    }
}
