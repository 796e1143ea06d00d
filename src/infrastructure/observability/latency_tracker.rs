use prometheus::{Gauge, Histogram};
use std::time::Instant;

/// RAII guard for measuring and recording latency in milliseconds
pub struct LatencyGuard {
    start: Instant,
    histogram: Option<Histogram>,
}

impl LatencyGuard {
    pub fn new(histogram: Histogram) -> Self {
        Self {
            start: Instant::now(),
            histogram: Some(histogram),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Drop the guard without recording an observation
    pub fn discard(mut self) {
        self.histogram = None;
    }
}

impl Drop for LatencyGuard {
    fn drop(&mut self) {
        if let Some(histogram) = self.histogram.take() {
            histogram.observe(self.elapsed_ms());
        }
    }
}

/// Increments a gauge on creation and decrements it on drop
pub struct InFlightGuard {
    gauge: Gauge,
}

impl InFlightGuard {
    pub fn new(gauge: Gauge) -> Self {
        gauge.inc();
        Self { gauge }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.gauge.dec();
    }
}
