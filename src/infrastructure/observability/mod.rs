//! Push-based observability for the backend
//!
//! Instruments live in one explicitly constructed [`Metrics`] value that is
//! cloned into every collaborator. Snapshots leave the process through:
//!
//! 1. **Scrape**: [`Metrics::render`] for whatever route serves `/metrics`
//! 2. **Prometheus Pushgateway**: [`PushgatewayClient`], optionally on a timer via [`MetricsReporter`]

pub mod latency_tracker;
pub mod metrics;
pub mod pushgateway;
pub mod reporter;

pub use latency_tracker::{InFlightGuard, LatencyGuard};
pub use metrics::{Metrics, TEXT_CONTENT_TYPE};
pub use pushgateway::PushgatewayClient;
pub use reporter::{MetricsReporter, ReporterStats};
