//! Result collector: the single consumer of the result channel.
//!
//! Failures surface here and nowhere else. The HTTP caller that queued the job
//! got its `202 Accepted` long before, so the collector logs and counts.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::types::{JobKind, JobResult, JobStatus};

/// Per-kind outcome counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindStats {
    pub completed: u64,
    pub failed: u64,
}

/// Point-in-time copy of the collector counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobStatsSnapshot {
    pub completed: u64,
    pub failed: u64,
    pub course_creation: KindStats,
    pub student_enrollment: KindStats,
    pub last_error: Option<String>,
}

/// Shared counters, written by the collector and read by the API.
#[derive(Debug, Default)]
pub struct JobStats {
    inner: Mutex<JobStatsSnapshot>,
}

impl JobStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> JobStatsSnapshot {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn record(&self, result: &JobResult) {
        let mut s = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let per_kind = match result.kind {
            JobKind::CourseCreation => &mut s.course_creation,
            JobKind::StudentEnrollment => &mut s.student_enrollment,
        };
        match result.status {
            JobStatus::Completed => per_kind.completed += 1,
            JobStatus::Failed => per_kind.failed += 1,
        }

        match result.status {
            JobStatus::Completed => s.completed += 1,
            JobStatus::Failed => {
                s.failed += 1;
                s.last_error = result.error.clone();
            }
        }
    }
}

/// Drains job results into logs and [`JobStats`].
#[derive(Debug, Clone)]
pub struct ResultCollector {
    stats: Arc<JobStats>,
}

impl ResultCollector {
    pub fn new(stats: Arc<JobStats>) -> Self {
        Self { stats }
    }

    /// Log and count one result.
    pub fn observe(&self, result: &JobResult) {
        match &result.error {
            Some(error) => warn!(
                worker = result.worker,
                job_kind = %result.kind,
                error = %error,
                "job failed"
            ),
            None => info!(
                worker = result.worker,
                job_kind = %result.kind,
                "job completed successfully"
            ),
        }
        self.stats.record(result);
    }

    /// Spawn the collector task.
    ///
    /// It runs until every sender of `results` has been dropped, i.e. until all
    /// workers have exited, so results produced during shutdown are still seen.
    pub fn spawn(self, mut results: mpsc::Receiver<JobResult>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("result collector started");
            while let Some(result) = results.recv().await {
                self.observe(&result);
            }
            info!("result collector stopped");
        })
    }
}
