use async_trait::async_trait;
use std::fmt;

/// Result of a single push attempt.
///
/// Failures are reported, not raised: the caller decides whether to care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    Pushed { job: String },
    Failed { job: String, reason: String },
}

impl PushOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PushOutcome::Pushed { .. })
    }

    pub fn job(&self) -> &str {
        match self {
            PushOutcome::Pushed { job } | PushOutcome::Failed { job, .. } => job,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            PushOutcome::Pushed { .. } => None,
            PushOutcome::Failed { reason, .. } => Some(reason),
        }
    }
}

impl fmt::Display for PushOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushOutcome::Pushed { job } => write!(f, "pushed job '{}'", job),
            PushOutcome::Failed { job, reason } => {
                write!(f, "push for job '{}' failed: {}", job, reason)
            }
        }
    }
}

/// Outbound sink for registry snapshots
#[async_trait]
pub trait MetricsPusher: Send + Sync {
    /// Push the current snapshot under `job_name`, or the configured default job.
    async fn push_metrics(&self, job_name: Option<&str>) -> PushOutcome;
}
