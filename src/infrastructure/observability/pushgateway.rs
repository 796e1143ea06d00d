//! Prometheus Pushgateway client
//!
//! Sends the registry snapshot with additive semantics: a `POST` to
//! `/metrics/job/<job>` replaces only the series it carries and leaves the
//! rest of the job's group untouched.

use crate::config::PushgatewayConfig;
use crate::domain::errors::MetricsError;
use crate::domain::ports::{MetricsPusher, PushOutcome};
use crate::infrastructure::core::HttpClientFactory;
use crate::infrastructure::observability::metrics::{Metrics, TEXT_CONTENT_TYPE};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, error};
use url::Url;

pub struct PushgatewayClient {
    http: Client,
    base_url: Url,
    default_job: String,
    metrics: Metrics,
}

impl PushgatewayClient {
    pub fn new(config: &PushgatewayConfig, metrics: Metrics) -> Result<Self, MetricsError> {
        let base_url = Url::parse(&config.url)?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(MetricsError::InvalidUrl(config.url.clone()));
        }
        if config.job_name.is_empty() {
            return Err(MetricsError::InvalidJobName);
        }

        Ok(Self {
            http: HttpClientFactory::create_client(config.timeout)?,
            base_url,
            default_job: config.job_name.clone(),
            metrics,
        })
    }

    pub fn default_job(&self) -> &str {
        &self.default_job
    }

    /// Grouping URL for `job`, with the job name percent-encoded as one path segment
    pub fn push_url(&self, job: &str) -> Result<Url, MetricsError> {
        if job.is_empty() {
            return Err(MetricsError::InvalidJobName);
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| MetricsError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["metrics", "job", job]);
        Ok(url)
    }

    /// Push once, propagating any failure to the caller.
    pub async fn try_push(&self, job_name: Option<&str>) -> Result<(), MetricsError> {
        let job = job_name.unwrap_or(self.default_job.as_str());
        let url = self.push_url(job)?;
        let body = self.metrics.encode()?;

        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, TEXT_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!("[Pushgateway] could not read rejection body: {}", e);
                    String::new()
                }
            };
            return Err(MetricsError::Rejected {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        Ok(())
    }

    /// Push once and report the outcome. Failures are logged here and never retried.
    pub async fn push_metrics(&self, job_name: Option<&str>) -> PushOutcome {
        let job = job_name.unwrap_or(self.default_job.as_str()).to_string();

        match self.try_push(Some(&job)).await {
            Ok(()) => {
                debug!(job = %job, "[Pushgateway] metrics pushed");
                PushOutcome::Pushed { job }
            }
            Err(e) => {
                error!(job = %job, "[Pushgateway] push failed: {}", e);
                PushOutcome::Failed {
                    job,
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[async_trait]
impl MetricsPusher for PushgatewayClient {
    async fn push_metrics(&self, job_name: Option<&str>) -> PushOutcome {
        PushgatewayClient::push_metrics(self, job_name).await
    }
}
