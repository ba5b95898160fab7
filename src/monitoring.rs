// Stage timing and run summaries reported through tracing
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Status of a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationStatus {
    InProgress,
    Completed,
    Failed,
}

/// Timing and volume of one finished stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetric {
    pub operation_name: String,
    pub status: OperationStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_ms: u64,
    pub records_processed: u64,
}

/// Tracks one stage of a run, such as introspection or emission
pub struct OperationTracker {
    pub operation_name: String,
    pub start_time: DateTime<Utc>,
    run_id: Uuid,
}

impl OperationTracker {
    fn finish(self, status: OperationStatus, records_processed: u64) -> PerformanceMetric {
        let end_time = Utc::now();
        let duration_ms = end_time
            .signed_duration_since(self.start_time)
            .num_milliseconds()
            .max(0) as u64;

        PerformanceMetric {
            operation_name: self.operation_name,
            status,
            start_time: self.start_time,
            end_time,
            duration_ms,
            records_processed,
        }
    }
}

/// All stage metrics of a single invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetrics {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub stages: Vec<PerformanceMetric>,
}

impl RunMetrics {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            stages: Vec::new(),
        }
    }

    /// Start tracking a new stage
    pub fn start(&self, operation_name: &str) -> OperationTracker {
        debug!(run_id = %self.run_id, operation_name = operation_name, "Started stage");
        OperationTracker {
            operation_name: operation_name.to_string(),
            start_time: Utc::now(),
            run_id: self.run_id,
        }
    }

    /// Mark a stage as successfully completed
    pub fn complete_success(&mut self, tracker: OperationTracker, records_processed: u64) {
        let run_id = tracker.run_id;
        let metric = tracker.finish(OperationStatus::Completed, records_processed);
        info!(
            run_id = %run_id,
            operation_name = %metric.operation_name,
            duration_ms = metric.duration_ms,
            records = records_processed,
            "Stage completed"
        );
        self.stages.push(metric);
    }

    /// Mark a stage as failed
    pub fn complete_failure(&mut self, tracker: OperationTracker, error: &str) {
        let run_id = tracker.run_id;
        let metric = tracker.finish(OperationStatus::Failed, 0);
        warn!(
            run_id = %run_id,
            operation_name = %metric.operation_name,
            duration_ms = metric.duration_ms,
            error = error,
            "Stage failed"
        );
        self.stages.push(metric);
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.stages.iter().map(|s| s.duration_ms).sum()
    }

    pub fn failed_stages(&self) -> usize {
        self.stages
            .iter()
            .filter(|s| s.status == OperationStatus::Failed)
            .count()
    }
}

impl Default for RunMetrics {
    fn default() -> Self {
        Self::new()
    }
}
