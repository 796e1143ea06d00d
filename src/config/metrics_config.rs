pub const DEFAULT_APP_LABEL: &str = "test-backend";

/// Registry construction settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Value of the `app` label stamped on every exported series
    pub app_label: String,
    /// Register the OS process collector (Linux only)
    pub collect_process_metrics: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            app_label: DEFAULT_APP_LABEL.to_string(),
            collect_process_metrics: true,
        }
    }
}

impl MetricsConfig {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            app_label: lookup("METRICS_APP_LABEL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.app_label),
            collect_process_metrics: lookup("METRICS_PROCESS_COLLECTOR")
                .and_then(|v| v.parse::<bool>().ok())
                .unwrap_or(defaults.collect_process_metrics),
        }
    }
}
