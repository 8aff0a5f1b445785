//! Display values derived from store contents. No I/O, no state.

use chrono::Duration;
use shared::{
    domain::RunStatus,
    protocol::{Experiment, Run},
};

pub const METRIC_PLACEHOLDER: &str = "-";
const SHORT_ID_LEN: usize = 8;

/// Four decimals, or the placeholder when the metric was not reported.
pub fn format_metric(value: Option<f64>) -> String {
    match value {
        Some(value) if value.is_finite() => format!("{value:.4}"),
        _ => METRIC_PLACEHOLDER.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Success,
    Failure,
    Pending,
}

impl From<RunStatus> for StatusTone {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Completed => Self::Success,
            RunStatus::Failed | RunStatus::Canceled => Self::Failure,
            RunStatus::Pending | RunStatus::Running => Self::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRow {
    pub status: String,
    pub tone: StatusTone,
    pub f1: String,
    pub p95_latency: String,
    pub short_id: String,
    pub elapsed: Option<String>,
}

impl From<&Run> for RunRow {
    fn from(run: &Run) -> Self {
        let metrics = run.metrics.as_ref();
        let elapsed = match (run.start_time, run.end_time) {
            (Some(start), Some(end)) if end >= start => Some(format_elapsed(end - start)),
            _ => None,
        };
        Self {
            status: run.status.to_string(),
            tone: run.status.into(),
            f1: format_metric(metrics.and_then(|m| m.f1)),
            p95_latency: format_metric(metrics.and_then(|m| m.p95_latency)),
            short_id: short_id(&run.id.to_string()),
            elapsed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentRow {
    pub id: String,
    pub name: String,
    pub vector: String,
}

impl From<&Experiment> for ExperimentRow {
    fn from(experiment: &Experiment) -> Self {
        Self {
            id: experiment.id.to_string(),
            name: experiment.name.clone(),
            vector: vector_summary(experiment),
        }
    }
}

fn vector_summary(experiment: &Experiment) -> String {
    match (experiment.vector_size(), experiment.vector_distance()) {
        (Some(size), Some(distance)) => format!("{size} x {distance}"),
        (Some(size), None) => size.to_string(),
        _ => {
            let mut names = experiment.named_vectors();
            if names.is_empty() {
                return METRIC_PLACEHOLDER.to_string();
            }
            names.sort_unstable();
            format!("multi: {}", names.join(", "))
        }
    }
}

fn short_id(id: &str) -> String {
    let prefix: String = id.chars().take(SHORT_ID_LEN).collect();
    format!("{prefix}...")
}

fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.num_seconds();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}h{minutes:02}m{seconds:02}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds:02}s")
    } else {
        format!("{seconds}.{}s", elapsed.num_milliseconds() % 1000 / 100)
    }
}
