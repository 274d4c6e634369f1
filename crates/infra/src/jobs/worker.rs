//! Worker loop and per-kind job execution.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::records::RecordStore;

use super::queue::JobReceiver;
use super::types::{Job, JobError, JobResult};

/// Execute one job against the store.
///
/// Nothing here retries; the caller turns the error into a failed result.
pub async fn execute_job(store: &dyn RecordStore, job: &Job) -> Result<(), JobError> {
    match job {
        Job::CourseCreation(course) => store
            .insert_course(course)
            .await
            .map_err(JobError::InsertFailed),
        Job::StudentEnrollment {
            student_id,
            course_id,
        } => {
            // Existence is checked now, not when the job was queued.
            if store
                .find_course(*course_id)
                .await
                .map_err(JobError::Store)?
                .is_none()
            {
                return Err(JobError::CourseNotFound);
            }

            let outcome = store
                .add_enrolled_course(*student_id, *course_id)
                .await
                .map_err(JobError::Store)?;
            if outcome.matched == 0 {
                return Err(JobError::StudentNotFound);
            }
            Ok(())
        }
    }
}

/// Spawn `count` worker tasks, numbered from 1.
///
/// Each task loops: dequeue, execute, send the result. It exits when `shutdown`
/// flips to `true` (or its sender is dropped), when the queue closes, or when
/// the result channel has no receiver left. A job that is already executing is
/// always finished and reported before the shutdown signal is looked at again.
pub fn spawn_workers(
    count: usize,
    jobs: JobReceiver,
    results: mpsc::Sender<JobResult>,
    store: Arc<dyn RecordStore>,
    shutdown: watch::Receiver<bool>,
) -> Vec<JoinHandle<()>> {
    (1..=count)
        .map(|id| {
            tokio::spawn(worker_loop(
                id,
                jobs.clone(),
                results.clone(),
                store.clone(),
                shutdown.clone(),
            ))
        })
        .collect()
}

async fn worker_loop(
    id: usize,
    jobs: JobReceiver,
    results: mpsc::Sender<JobResult>,
    store: Arc<dyn RecordStore>,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(worker = id, "worker started");

    loop {
        if *shutdown.borrow_and_update() {
            break;
        }

        let job = tokio::select! {
            biased;
            changed = shutdown.changed() => match changed {
                Ok(()) => continue,
                // Signal owner dropped: treat as shutdown.
                Err(_) => break,
            },
            job = jobs.recv() => match job {
                Some(job) => job,
                None => break,
            },
        };

        let kind = job.kind();
        debug!(worker = id, job_kind = %kind, "processing job");

        let result = match execute_job(store.as_ref(), &job).await {
            Ok(()) => {
                debug!(worker = id, job_kind = %kind, "job completed");
                JobResult::completed(kind, id)
            }
            Err(err) => JobResult::failed(kind, id, &err),
        };

        if results.send(result).await.is_err() {
            warn!(worker = id, "result channel closed; stopping worker");
            break;
        }
    }

    info!(worker = id, "worker stopped");
}
