// Domain-specific error types
pub mod errors;

// Port interfaces
pub mod ports;

pub use errors::MetricsError;
pub use ports::{MetricsPusher, PushOutcome};
