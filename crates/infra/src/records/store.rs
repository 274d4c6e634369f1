use async_trait::async_trait;
use thiserror::Error;

use coursework_catalog::{Course, Student};
use coursework_core::{CourseId, StudentId};

/// Record store error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A record with the same id already exists.
    #[error("duplicate key: {0}")]
    Duplicate(String),
    /// Connection, query or decoding failure.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Counts reported by a conditional update.
///
/// `matched` is the number of records the filter selected; `modified` is how
/// many of them actually changed. A matched-but-unmodified add-to-set means the
/// value was already present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

/// Document store for the two record collections.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a course. Fails with [`StoreError::Duplicate`] if the id exists.
    async fn insert_course(&self, course: &Course) -> Result<(), StoreError>;

    async fn find_course(&self, id: CourseId) -> Result<Option<Course>, StoreError>;

    /// All courses, oldest first.
    async fn list_courses(&self) -> Result<Vec<Course>, StoreError>;

    /// Insert a student. Fails with [`StoreError::Duplicate`] if the id exists.
    async fn insert_student(&self, student: &Student) -> Result<(), StoreError>;

    async fn find_student(&self, id: StudentId) -> Result<Option<Student>, StoreError>;

    /// Add `course_id` to the student's enrolled set if it is not already there.
    ///
    /// Must be atomic with respect to concurrent calls for the same student: two
    /// racing calls with the same course leave exactly one entry.
    async fn add_enrolled_course(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<UpdateOutcome, StoreError>;
}
