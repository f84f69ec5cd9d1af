//! Client configuration.
//!
//! # Design
//! `BaseUrl` is normalized once, at construction, and never mutated. Every
//! request URL is produced by `BaseUrl::resolve`, so the "at most one
//! separator between base and path" rule lives in exactly one place.
//! `QueueConfig` plays the role of the embedding environment's context: it is
//! only consulted when the request queue and default transport are built.

use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A base URL guaranteed to be empty or to end with `/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Normalize `base_url`. `None` and `""` give the empty base, in which
    /// case paths are used verbatim.
    pub fn new(base_url: Option<&str>) -> Self {
        match base_url {
            None | Some("") => Self(String::new()),
            Some(url) if url.ends_with('/') => Self(url.to_string()),
            Some(url) => Self(format!("{url}/")),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Join `path` onto the base, dropping a single leading `/` from `path`.
    /// No escaping or validation is performed.
    pub fn resolve(&self, path: &str) -> String {
        let path = path.strip_prefix('/').unwrap_or(path);
        format!("{}{path}", self.0)
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BaseUrl {
    fn from(url: &str) -> Self {
        Self::new(Some(url))
    }
}

/// Resources used to build the request queue and the default transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// Number of runtime worker threads, also the cap on concurrent blocking
    /// transport calls.
    pub workers: usize,
    /// Global per-request timeout applied by the default transport.
    pub timeout: Option<Duration>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: BaseUrl,
    pub queue: QueueConfig,
}

impl ClientConfig {
    /// Load configuration from `GOMA_BASE_URL`, `GOMA_WORKERS` and
    /// `GOMA_TIMEOUT_MS`. Unset variables fall back to the defaults;
    /// `GOMA_TIMEOUT_MS=0` disables the timeout.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = BaseUrl::new(lookup("GOMA_BASE_URL").as_deref());

        let mut queue = QueueConfig::default();
        if let Some(value) = lookup("GOMA_WORKERS") {
            let workers = parse_number("GOMA_WORKERS", &value)?;
            queue.workers = usize::try_from(workers)
                .ok()
                .filter(|w| *w > 0)
                .ok_or(ConfigError::InvalidNumber {
                    var: "GOMA_WORKERS",
                    value,
                })?;
        }
        if let Some(value) = lookup("GOMA_TIMEOUT_MS") {
            let ms = parse_number("GOMA_TIMEOUT_MS", &value)?;
            queue.timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }

        Ok(Self { base_url, queue })
    }
}

fn parse_number(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        var,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn trailing_separator_is_appended() {
        assert_eq!(BaseUrl::new(Some("http://host/api")).as_str(), "http://host/api/");
    }

    #[test]
    fn existing_trailing_separator_is_kept() {
        assert_eq!(BaseUrl::new(Some("http://host/api/")).as_str(), "http://host/api/");
    }

    #[test]
    fn missing_or_empty_base_is_empty() {
        assert!(BaseUrl::new(None).is_empty());
        assert!(BaseUrl::new(Some("")).is_empty());
    }

    #[test]
    fn resolve_with_and_without_leading_separator() {
        let base = BaseUrl::new(Some("http://host/api"));
        assert_eq!(base.resolve("users"), "http://host/api/users");
        assert_eq!(base.resolve("/users"), "http://host/api/users");
    }

    #[test]
    fn resolve_strips_only_one_separator() {
        let base = BaseUrl::new(Some("http://host/api/"));
        assert_eq!(base.resolve("//users"), "http://host/api//users");
    }

    #[test]
    fn resolve_empty_path_is_base() {
        let base = BaseUrl::new(Some("http://host/api"));
        assert_eq!(base.resolve(""), "http://host/api/");
    }

    #[test]
    fn resolve_against_empty_base_uses_path() {
        let base = BaseUrl::new(None);
        assert_eq!(base.resolve("http://other/x"), "http://other/x");
    }

    #[test]
    fn resolve_does_not_escape() {
        let base = BaseUrl::new(Some("http://host"));
        assert_eq!(base.resolve("a b?c=d&e"), "http://host/a b?c=d&e");
    }

    #[test]
    fn from_env_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.base_url.is_empty());
        assert_eq!(config.queue, QueueConfig::default());
    }

    #[test]
    fn from_env_reads_all_variables() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("GOMA_BASE_URL", "http://host/api"),
            ("GOMA_WORKERS", "2"),
            ("GOMA_TIMEOUT_MS", "1500"),
        ]))
        .unwrap();
        assert_eq!(config.base_url.as_str(), "http://host/api/");
        assert_eq!(config.queue.workers, 2);
        assert_eq!(config.queue.timeout, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn from_env_zero_timeout_disables_it() {
        let config = ClientConfig::from_lookup(lookup(&[("GOMA_TIMEOUT_MS", "0")])).unwrap();
        assert_eq!(config.queue.timeout, None);
    }

    #[test]
    fn from_env_rejects_bad_numbers() {
        let err = ClientConfig::from_lookup(lookup(&[("GOMA_WORKERS", "many")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { var: "GOMA_WORKERS", .. }));

        let err = ClientConfig::from_lookup(lookup(&[("GOMA_WORKERS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { var: "GOMA_WORKERS", .. }));

        let err = ClientConfig::from_lookup(lookup(&[("GOMA_TIMEOUT_MS", "-1")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { var: "GOMA_TIMEOUT_MS", .. }));
    }
}
