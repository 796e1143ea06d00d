//! Configuration module for backend-metrics.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Registry, Pushgateway target, and periodic Observability push.

mod metrics_config;
mod observability_config;
mod pushgateway_config;

pub use metrics_config::{DEFAULT_APP_LABEL, MetricsConfig};
pub use observability_config::ObservabilityEnvConfig;
pub use pushgateway_config::{DEFAULT_JOB_NAME, DEFAULT_PUSHGATEWAY_URL, PushgatewayConfig};

use anyhow::{Context, Result, bail};
use std::env;

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub metrics: MetricsConfig,
    pub pushgateway: PushgatewayConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            metrics: MetricsConfig::from_lookup(&lookup),
            pushgateway: PushgatewayConfig::from_lookup(&lookup),
            observability: ObservabilityEnvConfig::from_lookup(&lookup),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.pushgateway.url)
            .with_context(|| format!("Invalid PUSHGATEWAY_URL: {}", self.pushgateway.url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!(
                "Invalid PUSHGATEWAY_URL scheme: {}. Must be 'http' or 'https'",
                url.scheme()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from<'a>(vars: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |k: &str| vars.get(k).map(|v| v.to_string())
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.pushgateway.url, DEFAULT_PUSHGATEWAY_URL);
        assert_eq!(config.metrics.app_label, DEFAULT_APP_LABEL);
    }

    #[test]
    fn test_config_collects_all_sections() {
        let vars = HashMap::from([
            ("PUSHGATEWAY_URL", "https://push.internal:9091"),
            ("METRICS_APP_LABEL", "checkout"),
            ("PUSHGATEWAY_ENABLED", "false"),
        ]);
        let config = Config::from_lookup(lookup_from(&vars)).unwrap();
        assert_eq!(config.pushgateway.url, "https://push.internal:9091");
        assert_eq!(config.metrics.app_label, "checkout");
        assert!(!config.observability.enabled);
    }

    #[test]
    fn test_config_rejects_malformed_url() {
        let vars = HashMap::from([("PUSHGATEWAY_URL", "pushgateway:9091/no scheme")]);
        assert!(Config::from_lookup(lookup_from(&vars)).is_err());
    }

    #[test]
    fn test_config_rejects_non_http_scheme() {
        let vars = HashMap::from([("PUSHGATEWAY_URL", "ftp://pushgateway:9091")]);
        let err = Config::from_lookup(lookup_from(&vars)).unwrap_err();
        assert!(err.to_string().contains("ftp"));
    }
}
