//! Pushgateway target configuration.

use std::time::Duration;

pub const DEFAULT_PUSHGATEWAY_URL: &str = "http://pushgateway:9091";
pub const DEFAULT_JOB_NAME: &str = "test-backend";

/// Where and how snapshots are pushed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushgatewayConfig {
    /// Base URL of the Pushgateway, without the `/metrics/job/...` path
    pub url: String,
    /// Job name used when the caller does not supply one
    pub job_name: String,
    /// Optional request deadline; `None` leaves the transport default in place
    pub timeout: Option<Duration>,
}

impl Default for PushgatewayConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_PUSHGATEWAY_URL.to_string(),
            job_name: DEFAULT_JOB_NAME.to_string(),
            timeout: None,
        }
    }
}

impl PushgatewayConfig {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            url: lookup("PUSHGATEWAY_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.url),
            job_name: lookup("PUSHGATEWAY_JOB_NAME")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.job_name),
            timeout: lookup("PUSHGATEWAY_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}
