//! Observability configuration parsing from environment variables.
//!
//! This module handles loading the periodic push settings.

use std::time::Duration;

/// Periodic push reporter configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityEnvConfig {
    pub enabled: bool,
    pub push_interval: Duration,
}

impl Default for ObservabilityEnvConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            push_interval: Duration::from_secs(15),
        }
    }
}

impl ObservabilityEnvConfig {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            enabled: lookup("PUSHGATEWAY_ENABLED")
                .and_then(|v| v.parse::<bool>().ok())
                .unwrap_or(defaults.enabled),
            push_interval: lookup("PUSHGATEWAY_INTERVAL_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.push_interval),
        }
    }
}
