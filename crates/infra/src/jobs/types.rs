//! Core job types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use coursework_catalog::Course;
use coursework_core::{CourseId, StudentId};

use crate::records::StoreError;

/// Job kind, used for routing results and for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    CourseCreation,
    StudentEnrollment,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::CourseCreation => "course_creation",
            JobKind::StudentEnrollment => "student_enrollment",
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A deferred mutation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Insert a course whose id was already assigned by the caller.
    CourseCreation(Course),
    /// Add `course_id` to the student's enrolled set.
    StudentEnrollment {
        student_id: StudentId,
        course_id: CourseId,
    },
}

impl Job {
    pub fn kind(&self) -> JobKind {
        match self {
            Job::CourseCreation(_) => JobKind::CourseCreation,
            Job::StudentEnrollment { .. } => JobKind::StudentEnrollment,
        }
    }
}

/// Why a job failed. Rendered into `JobResult::error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("insert failed: {0}")]
    InsertFailed(StoreError),
    #[error("course not found")]
    CourseNotFound,
    #[error("student not found")]
    StudentNotFound,
    #[error("{0}")]
    Store(StoreError),
}

/// Terminal status of an executed job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Completed,
    Failed,
}

/// Outcome of executing one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobResult {
    pub kind: JobKind,
    pub status: JobStatus,
    pub error: Option<String>,
    /// Index of the worker that executed the job.
    pub worker: usize,
}

impl JobResult {
    pub fn completed(kind: JobKind, worker: usize) -> Self {
        Self {
            kind,
            status: JobStatus::Completed,
            error: None,
            worker,
        }
    }

    pub fn failed(kind: JobKind, worker: usize, error: &JobError) -> Self {
        Self {
            kind,
            status: JobStatus::Failed,
            error: Some(error.to_string()),
            worker,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == JobStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_are_stable() {
        assert_eq!(JobKind::CourseCreation.to_string(), "course_creation");
        assert_eq!(JobKind::StudentEnrollment.to_string(), "student_enrollment");
        assert_eq!(
            serde_json::to_value(JobKind::StudentEnrollment).unwrap(),
            serde_json::json!("student_enrollment")
        );
    }

    #[test]
    fn failure_reasons_match_log_format() {
        let insert = JobError::InsertFailed(StoreError::Duplicate("course x".into()));
        assert_eq!(insert.to_string(), "insert failed: duplicate key: course x");
        assert_eq!(JobError::CourseNotFound.to_string(), "course not found");
        assert_eq!(JobError::StudentNotFound.to_string(), "student not found");
        assert_eq!(
            JobError::Store(StoreError::Storage("down".into())).to_string(),
            "storage error: down"
        );
    }

    #[test]
    fn failed_result_carries_reason() {
        let r = JobResult::failed(JobKind::StudentEnrollment, 2, &JobError::StudentNotFound);
        assert!(!r.is_success());
        assert_eq!(r.error.as_deref(), Some("student not found"));
        assert_eq!(r.worker, 2);
    }

    #[test]
    fn job_reports_its_kind() {
        let job = Job::StudentEnrollment {
            student_id: StudentId::new(),
            course_id: CourseId::new(),
        };
        assert_eq!(job.kind(), JobKind::StudentEnrollment);
    }
}
