use thiserror::Error;

/// Errors raised while building the metrics registry or pushing snapshots
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Metric registration failed: {0}")]
    Registration(#[from] prometheus::Error),

    #[error("Failed to encode metrics: {0}")]
    Encode(String),

    #[error("Job name must not be empty")]
    InvalidJobName,

    #[error("Invalid Pushgateway URL: {0}")]
    InvalidUrl(String),

    #[error("Pushgateway transport error: {0}")]
    Transport(String),

    #[error("Pushgateway rejected push: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl From<reqwest::Error> for MetricsError {
    fn from(err: reqwest::Error) -> Self {
        MetricsError::Transport(err.to_string())
    }
}

impl From<url::ParseError> for MetricsError {
    fn from(err: url::ParseError) -> Self {
        MetricsError::InvalidUrl(err.to_string())
    }
}
