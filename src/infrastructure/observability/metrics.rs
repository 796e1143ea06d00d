//! Prometheus metrics definitions for the backend
//!
//! Every exported series carries the configured `app` label.
//! Histogram durations are in milliseconds.

use crate::config::MetricsConfig;
use crate::domain::errors::MetricsError;
use prometheus::core::{Collector, Desc};
use prometheus::{
    CounterVec, Gauge, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Content type of the text exposition format produced by [`Metrics::render`]
pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub const HTTP_DURATION_BUCKETS_MS: [f64; 10] = [
    5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0,
];

pub const DB_DURATION_BUCKETS_MS: [f64; 9] =
    [1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0];

/// Prometheus metrics for the backend
///
/// Cheap to clone; every clone shares the same registry and handles.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,

    // HTTP
    /// Request latency by method, route and status code
    pub http_request_duration_ms: HistogramVec,
    pub http_requests_total: CounterVec,
    /// Requests currently being processed
    pub http_requests_in_flight: Gauge,

    // Database
    /// MongoDB operation latency by operation, collection and status
    pub db_operation_duration_ms: HistogramVec,
    pub db_operations_total: CounterVec,
    pub db_connection_pool_active: Gauge,

    // Business
    pub orders_created_total: CounterVec,
    pub payments_total: CounterVec,
    /// Approximate revenue in USD, labelled by the original currency
    pub revenue_total_usd: CounterVec,

    // Security / Errors
    pub errors_total: CounterVec,
    pub auth_failures_total: CounterVec,
    pub rate_limit_hits_total: CounterVec,

    // Workers
    pub jobs_completed_total: CounterVec,
    pub queue_depth: GaugeVec,
}

impl Metrics {
    /// Create a new Metrics instance with every instrument registered
    pub fn new(config: &MetricsConfig) -> Result<Self, MetricsError> {
        let default_labels = HashMap::from([("app".to_string(), config.app_label.clone())]);
        let registry = Registry::new_custom(None, Some(default_labels))?;

        if config.collect_process_metrics {
            register_process_collector(&registry)?;
        }

        // HTTP
        let http_request_duration_ms = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_ms",
                "Duration of HTTP requests in milliseconds",
            )
            .buckets(HTTP_DURATION_BUCKETS_MS.to_vec()),
            &["method", "route", "status_code"],
        )?;
        registry.register(Box::new(http_request_duration_ms.clone()))?;

        let http_requests_total = CounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "route", "status_code"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_requests_in_flight = Gauge::with_opts(Opts::new(
            "http_requests_in_flight",
            "Number of HTTP requests currently being processed",
        ))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;

        // Database
        let db_operation_duration_ms = HistogramVec::new(
            HistogramOpts::new(
                "db_operation_duration_ms",
                "Duration of MongoDB operations in milliseconds",
            )
            .buckets(DB_DURATION_BUCKETS_MS.to_vec()),
            &["operation", "collection", "status"],
        )?;
        registry.register(Box::new(db_operation_duration_ms.clone()))?;

        let db_operations_total = CounterVec::new(
            Opts::new(
                "db_operations_total",
                "Total number of database operations",
            ),
            &["operation", "collection", "status"],
        )?;
        registry.register(Box::new(db_operations_total.clone()))?;

        let db_connection_pool_active = Gauge::with_opts(Opts::new(
            "db_connection_pool_active",
            "Active MongoDB connection pool connections",
        ))?;
        registry.register(Box::new(db_connection_pool_active.clone()))?;

        // Business
        let orders_created_total = CounterVec::new(
            Opts::new("orders_created_total", "Total number of orders created"),
            &["currency", "payment_method"],
        )?;
        registry.register(Box::new(orders_created_total.clone()))?;

        let payments_total = CounterVec::new(
            Opts::new("payments_total", "Total number of payments processed"),
            &["status", "gateway"],
        )?;
        registry.register(Box::new(payments_total.clone()))?;

        let revenue_total_usd = CounterVec::new(
            Opts::new(
                "revenue_total_usd",
                "Total revenue processed in USD (approximate)",
            ),
            &["currency"],
        )?;
        registry.register(Box::new(revenue_total_usd.clone()))?;

        // Security / Errors
        let errors_total = CounterVec::new(
            Opts::new("errors_total", "Total number of application errors"),
            &["type", "severity", "service"],
        )?;
        registry.register(Box::new(errors_total.clone()))?;

        let auth_failures_total = CounterVec::new(
            Opts::new(
                "auth_failures_total",
                "Total number of authentication failures",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(auth_failures_total.clone()))?;

        let rate_limit_hits_total = CounterVec::new(
            Opts::new(
                "rate_limit_hits_total",
                "Total number of rate-limit triggers",
            ),
            &["endpoint"],
        )?;
        registry.register(Box::new(rate_limit_hits_total.clone()))?;

        // Workers
        let jobs_completed_total = CounterVec::new(
            Opts::new(
                "jobs_completed_total",
                "Total number of background jobs completed",
            ),
            &["job_type", "queue", "status"],
        )?;
        registry.register(Box::new(jobs_completed_total.clone()))?;

        let queue_depth = GaugeVec::new(
            Opts::new("queue_depth", "Current depth of a job queue"),
            &["queue"],
        )?;
        registry.register(Box::new(queue_depth.clone()))?;

        debug!(app = %config.app_label, "Metrics registry initialized");

        Ok(Self {
            registry: Arc::new(registry),
            http_request_duration_ms,
            http_requests_total,
            http_requests_in_flight,
            db_operation_duration_ms,
            db_operations_total,
            db_connection_pool_active,
            orders_created_total,
            payments_total,
            revenue_total_usd,
            errors_total,
            auth_failures_total,
            rate_limit_hits_total,
            jobs_completed_total,
            queue_depth,
        })
    }

    /// Shared registry, for scrape handlers that encode it themselves
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encode the current snapshot in Prometheus text format
    ///
    /// Every declared instrument is exported with its `# HELP` and `# TYPE`
    /// lines, even before it holds a series.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut output = encoder
            .encode_to_string(&metric_families)
            .map_err(|e| MetricsError::Encode(e.to_string()))?;

        // gather() skips vectors without children
        for (desc, kind) in self.declared_families() {
            let type_line = format!("# TYPE {} {}\n", desc.fq_name, kind);
            if !output.contains(&type_line) {
                output.push_str(&format!(
                    "# HELP {} {}\n",
                    desc.fq_name,
                    escape_help(&desc.help)
                ));
                output.push_str(&type_line);
            }
        }
        Ok(output)
    }

    /// Descriptor and exposition type of every declared instrument
    fn declared_families(&self) -> Vec<(&Desc, &'static str)> {
        let collectors: [(&dyn Collector, &'static str); 14] = [
            (&self.http_request_duration_ms, "histogram"),
            (&self.http_requests_total, "counter"),
            (&self.http_requests_in_flight, "gauge"),
            (&self.db_operation_duration_ms, "histogram"),
            (&self.db_operations_total, "counter"),
            (&self.db_connection_pool_active, "gauge"),
            (&self.orders_created_total, "counter"),
            (&self.payments_total, "counter"),
            (&self.revenue_total_usd, "counter"),
            (&self.errors_total, "counter"),
            (&self.auth_failures_total, "counter"),
            (&self.rate_limit_hits_total, "counter"),
            (&self.jobs_completed_total, "counter"),
            (&self.queue_depth, "gauge"),
        ];
        collectors
            .into_iter()
            .flat_map(|(collector, kind)| collector.desc().into_iter().map(move |d| (d, kind)))
            .collect()
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        self.encode().unwrap_or_else(|e| {
            warn!("Failed to render metrics: {}", e);
            String::new()
        })
    }

    /// Count a finished HTTP request and observe its latency
    pub fn record_http_request(
        &self,
        method: &str,
        route: &str,
        status_code: &str,
        duration_ms: f64,
    ) {
        let labels = [method, route, status_code];
        self.http_request_duration_ms
            .with_label_values(&labels)
            .observe(duration_ms);
        self.http_requests_total.with_label_values(&labels).inc();
    }

    /// Count a finished database operation and observe its latency
    pub fn record_db_operation(
        &self,
        operation: &str,
        collection: &str,
        status: &str,
        duration_ms: f64,
    ) {
        let labels = [operation, collection, status];
        self.db_operation_duration_ms
            .with_label_values(&labels)
            .observe(duration_ms);
        self.db_operations_total.with_label_values(&labels).inc();
    }

    pub fn inc_orders_created(&self, currency: &str, payment_method: &str) {
        self.orders_created_total
            .with_label_values(&[currency, payment_method])
            .inc();
    }

    pub fn inc_payments(&self, status: &str, gateway: &str) {
        self.payments_total.with_label_values(&[status, gateway]).inc();
    }

    /// Add to the revenue counter. Negative amounts (refunds) are ignored.
    pub fn add_revenue(&self, currency: &str, amount_usd: f64) {
        if !amount_usd.is_finite() || amount_usd < 0.0 {
            warn!(currency, amount_usd, "Ignoring non-positive revenue amount");
            return;
        }
        self.revenue_total_usd
            .with_label_values(&[currency])
            .inc_by(amount_usd);
    }

    pub fn inc_errors(&self, error_type: &str, severity: &str, service: &str) {
        self.errors_total
            .with_label_values(&[error_type, severity, service])
            .inc();
    }

    pub fn inc_auth_failures(&self, reason: &str) {
        self.auth_failures_total.with_label_values(&[reason]).inc();
    }

    pub fn inc_rate_limit_hits(&self, endpoint: &str) {
        self.rate_limit_hits_total
            .with_label_values(&[endpoint])
            .inc();
    }

    pub fn inc_jobs_completed(&self, job_type: &str, queue: &str, status: &str) {
        self.jobs_completed_total
            .with_label_values(&[job_type, queue, status])
            .inc();
    }

    pub fn set_queue_depth(&self, queue: &str, depth: f64) {
        self.queue_depth.with_label_values(&[queue]).set(depth);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new(&MetricsConfig::default()).expect("Failed to create default Metrics")
    }
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

#[cfg(target_os = "linux")]
fn register_process_collector(registry: &Registry) -> Result<(), MetricsError> {
    use prometheus::process_collector::ProcessCollector;

    registry.register(Box::new(ProcessCollector::for_self()))?;
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn register_process_collector(_registry: &Registry) -> Result<(), MetricsError> {
    debug!("Process metrics are only collected on Linux; skipping");
    Ok(())
}
