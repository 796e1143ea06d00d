//! Metric instruments for the backend, registered in one shared registry and
//! pushed to a Prometheus Pushgateway.

pub mod config;
pub mod domain;
pub mod infrastructure;
