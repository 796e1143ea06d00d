//! Push-based metrics reporter
//!
//! Periodically pushes the registry snapshot to the Pushgateway.
//! Push failures are ignored by policy: the pusher has already logged them and
//! the registry stays scrapable regardless.

use crate::domain::ports::{MetricsPusher, PushOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Push-based metrics reporter
pub struct MetricsReporter {
    pusher: Arc<dyn MetricsPusher>,
    job_name: Option<String>,
    interval: Duration,
}

/// Counters describing how a reporter run went
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReporterStats {
    pub pushed: u64,
    pub failed: u64,
}

impl MetricsReporter {
    /// Create a new metrics reporter
    ///
    /// # Arguments
    /// * `pusher` - Outbound sink, normally a `PushgatewayClient`
    /// * `job_name` - Job to push under; `None` uses the pusher's default
    /// * `interval` - Time between pushes
    pub fn new(pusher: Arc<dyn MetricsPusher>, job_name: Option<String>, interval: Duration) -> Self {
        Self {
            pusher,
            job_name,
            interval,
        }
    }

    /// Push one snapshot
    pub async fn tick(&self) -> PushOutcome {
        self.pusher.push_metrics(self.job_name.as_deref()).await
    }

    /// Push on every interval until `shutdown` flips to `true` or its sender is dropped.
    ///
    /// A push still in flight when shutdown arrives is abandoned. A final push,
    /// bounded by one interval, is made on shutdown so short-lived processes
    /// still report.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> ReporterStats {
        info!(
            "MetricsReporter: Starting push-based metrics (interval: {:?})",
            self.interval
        );

        let mut stats = ReporterStats::default();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; skip it so the first push waits one interval.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.wait_for(|stop| *stop) => break,
            }

            tokio::select! {
                outcome = self.tick() => stats.record(&outcome),
                _ = shutdown.wait_for(|stop| *stop) => {
                    warn!("MetricsReporter: abandoning in-flight push on shutdown");
                    stats.failed += 1;
                    break;
                }
            }
        }

        debug!("MetricsReporter: final push before shutdown");
        match tokio::time::timeout(self.interval, self.tick()).await {
            Ok(outcome) => stats.record(&outcome),
            Err(_) => {
                warn!(
                    "MetricsReporter: final push did not finish within {:?}",
                    self.interval
                );
                stats.failed += 1;
            }
        }

        info!(
            "MetricsReporter: stopped ({} pushed, {} failed)",
            stats.pushed, stats.failed
        );
        stats
    }
}

impl ReporterStats {
    fn record(&mut self, outcome: &PushOutcome) {
        if outcome.is_success() {
            self.pushed += 1;
        } else {
            self.failed += 1;
        }
    }
}
