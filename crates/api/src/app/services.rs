use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use coursework_catalog::{Course, NewCourse, NewStudent, Student};
use coursework_core::{CourseId, DomainError, Entity, StudentId};
use coursework_infra::{
    jobs::{EnqueueError, Job, JobQueue, JobStats, JobStatsSnapshot, WorkerPool, WorkerPoolHandle},
    records::{InMemoryRecordStore, RecordStore, StoreError},
};

use crate::config::ServeConfig;

/// Errors surfaced by [`AppServices`] to the HTTP layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Enqueue(#[from] EnqueueError),
}

/// Job counters plus the live queue gauges, as served on `/jobs/stats`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct JobsOverview {
    #[serde(flatten)]
    pub stats: JobStatsSnapshot,
    pub queue_depth: usize,
    pub queue_capacity: usize,
}

/// Shared application context handed to every handler.
///
/// Holds the store for synchronous paths and the producer side of the job
/// queue for deferred writes. The worker pool itself lives in `main`.
#[derive(Clone)]
pub struct AppServices {
    store: Arc<dyn RecordStore>,
    queue: JobQueue,
    stats: Arc<JobStats>,
}

impl AppServices {
    pub fn new(store: Arc<dyn RecordStore>, queue: JobQueue, stats: Arc<JobStats>) -> Self {
        Self {
            store,
            queue,
            stats,
        }
    }

    /// Validate, assign an id and defer the insert. Returns the new id.
    pub async fn create_course(&self, cmd: NewCourse) -> Result<CourseId, ServiceError> {
        let course = Course::create(cmd, Utc::now())?;
        let id = course.id();
        self.queue.enqueue(Job::CourseCreation(course)).await?;
        tracing::debug!(course_id = %id, "course creation queued");
        Ok(id)
    }

    pub async fn list_courses(&self) -> Result<Vec<Course>, ServiceError> {
        Ok(self.store.list_courses().await?)
    }

    pub async fn create_student(&self, cmd: NewStudent) -> Result<Student, ServiceError> {
        let student = Student::register(cmd, Utc::now())?;
        self.store.insert_student(&student).await?;
        tracing::info!(student_id = %student.id(), "student created");
        Ok(student)
    }

    pub async fn get_student(&self, id: StudentId) -> Result<Student, ServiceError> {
        self.store
            .find_student(id)
            .await?
            .ok_or(ServiceError::Domain(DomainError::not_found("student")))
    }

    /// Defer an enrollment. Existence of either record is checked by the worker.
    pub async fn enroll(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<(), ServiceError> {
        self.queue
            .enqueue(Job::StudentEnrollment {
                student_id,
                course_id,
            })
            .await?;
        tracing::debug!(%student_id, %course_id, "enrollment queued");
        Ok(())
    }

    pub fn jobs_overview(&self) -> JobsOverview {
        JobsOverview {
            stats: self.stats.snapshot(),
            queue_depth: self.queue.depth(),
            queue_capacity: self.queue.capacity(),
        }
    }

    pub fn enqueue_timeout_secs(&self) -> u64 {
        self.queue.enqueue_timeout().as_secs().max(1)
    }
}

/// Pick the record store and start the worker pool.
///
/// With the `postgres` feature and `DATABASE_URL` set, records go to Postgres.
/// Otherwise an in-memory store is used.
pub async fn build_services(
    config: &ServeConfig,
) -> Result<(Arc<AppServices>, WorkerPoolHandle), StoreError> {
    let store = build_store(config).await?;
    let pool = WorkerPool::start(config.pool_config(), store.clone());
    let services = AppServices::new(store, pool.queue(), pool.stats_handle());
    Ok((Arc::new(services), pool))
}

#[cfg(feature = "postgres")]
async fn build_store(config: &ServeConfig) -> Result<Arc<dyn RecordStore>, StoreError> {
    use coursework_infra::records::PostgresRecordStore;

    match config.database_url.as_deref() {
        Some(url) => {
            let store = PostgresRecordStore::connect(url, 10).await?;
            store.ensure_schema().await?;
            tracing::info!("using postgres record store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; falling back to in-memory record store");
            Ok(Arc::new(InMemoryRecordStore::new()))
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn build_store(config: &ServeConfig) -> Result<Arc<dyn RecordStore>, StoreError> {
    if config.database_url.is_some() {
        tracing::warn!(
            "DATABASE_URL is set but the `postgres` feature is disabled; using in-memory record store"
        );
    }
    Ok(Arc::new(InMemoryRecordStore::new()))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use coursework_infra::jobs::{job_queue, JobReceiver};

    use super::*;

    /// Services whose queue nobody consumes; the receiver keeps it open.
    fn services_without_workers(
        capacity: usize,
    ) -> (AppServices, Arc<InMemoryRecordStore>, JobReceiver) {
        let store = Arc::new(InMemoryRecordStore::new());
        let (queue, jobs) = job_queue(capacity, Duration::from_millis(10));
        let services = AppServices::new(store.clone(), queue, Arc::new(JobStats::new()));
        (services, store, jobs)
    }

    fn new_course(title: &str) -> NewCourse {
        NewCourse {
            title: title.to_string(),
            description: String::new(),
            instructor: "Hopper".to_string(),
        }
    }

    #[tokio::test]
    async fn invalid_course_is_rejected_before_enqueue() {
        let (services, _, _jobs) = services_without_workers(4);

        let err = services.create_course(new_course("  ")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));
        assert_eq!(services.jobs_overview().queue_depth, 0);
    }

    #[tokio::test]
    async fn create_course_only_queues() {
        let (services, store, _jobs) = services_without_workers(4);

        services.create_course(new_course("CS101")).await.unwrap();
        assert_eq!(services.jobs_overview().queue_depth, 1);
        assert!(store.list_courses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn full_queue_surfaces_enqueue_error() {
        let (services, _, _jobs) = services_without_workers(1);
        services.create_course(new_course("A")).await.unwrap();

        let err = services
            .enroll(StudentId::new(), CourseId::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Enqueue(EnqueueError::QueueFull { capacity: 1 })
        ));
    }

    #[tokio::test]
    async fn student_round_trip_and_missing_student() {
        let (services, _, _jobs) = services_without_workers(1);

        let created = services
            .create_student(NewStudent {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(services.get_student(created.id()).await.unwrap(), created);

        let err = services.get_student(StudentId::new()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::NotFound("student"))));
    }
}
