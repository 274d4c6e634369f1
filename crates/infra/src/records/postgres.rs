//! Postgres-backed record store.
//!
//! Each collection maps to one table. The enrolled set is a `uuid[]` column and
//! the add-to-set is a guarded `UPDATE`, so concurrent enrollments for the same
//! student serialize on the row lock and never append twice.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Duplicate` |
//! | Database (other) | Any other | `Storage` |
//! | Anything else | N/A | `Storage` |

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::instrument;
use uuid::Uuid;

use coursework_catalog::{Course, Student};
use coursework_core::{CourseId, Entity, StudentId};

use super::store::{RecordStore, StoreError, UpdateOutcome};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS courses (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        instructor TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS students (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        enrolled_courses UUID[] NOT NULL DEFAULT '{}',
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
];

/// Postgres-backed record store.
///
/// Uses the SQLx connection pool, which is `Send + Sync` and shared by every
/// worker and handler.
#[derive(Debug, Clone)]
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect with a small pool sized for the worker count plus handlers.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(*statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("{}: {}", operation, db_err.message());
            match db_err.code() {
                Some(code) if code.as_ref() == "23505" => StoreError::Duplicate(msg),
                _ => StoreError::Storage(msg),
            }
        }
        other => StoreError::Storage(format!("{}: {}", operation, other)),
    }
}

fn course_from_row(row: &PgRow) -> Result<Course, sqlx::Error> {
    let id: Uuid = row.try_get("id")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    Ok(Course {
        id: CourseId::from_uuid(id),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        instructor: row.try_get("instructor")?,
        created_at,
    })
}

fn student_from_row(row: &PgRow) -> Result<Student, sqlx::Error> {
    let id: Uuid = row.try_get("id")?;
    let enrolled: Vec<Uuid> = row.try_get("enrolled_courses")?;
    Ok(Student::restore(
        StudentId::from_uuid(id),
        row.try_get("name")?,
        row.try_get("email")?,
        enrolled.into_iter().map(CourseId::from_uuid),
        row.try_get("created_at")?,
    ))
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    #[instrument(skip(self, course), fields(course_id = %course.id()))]
    async fn insert_course(&self, course: &Course) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO courses (id, title, description, instructor, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(*course.id().as_uuid())
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.instructor)
        .bind(course.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_course", e))?;
        Ok(())
    }

    async fn find_course(&self, id: CourseId) -> Result<Option<Course>, StoreError> {
        let row = sqlx::query(
            "SELECT id, title, description, instructor, created_at FROM courses WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_course", e))?;

        row.as_ref()
            .map(course_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("find_course", e))
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, title, description, instructor, created_at FROM courses ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_courses", e))?;

        rows.iter()
            .map(course_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("list_courses", e))
    }

    #[instrument(skip(self, student), fields(student_id = %student.id()))]
    async fn insert_student(&self, student: &Student) -> Result<(), StoreError> {
        let enrolled: Vec<Uuid> = student
            .enrolled_courses()
            .iter()
            .map(|c| *c.as_uuid())
            .collect();

        sqlx::query(
            r#"
            INSERT INTO students (id, name, email, enrolled_courses, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(*student.id().as_uuid())
        .bind(student.name())
        .bind(student.email())
        .bind(&enrolled)
        .bind(student.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_student", e))?;
        Ok(())
    }

    async fn find_student(&self, id: StudentId) -> Result<Option<Student>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, email, enrolled_courses, created_at FROM students WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_student", e))?;

        row.as_ref()
            .map(student_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("find_student", e))
    }

    #[instrument(skip(self))]
    async fn add_enrolled_course(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<UpdateOutcome, StoreError> {
        // Under READ COMMITTED a blocked UPDATE re-checks the guard against the
        // committed row, so a racing duplicate append matches zero rows.
        let modified = sqlx::query(
            r#"
            UPDATE students
            SET enrolled_courses = array_append(enrolled_courses, $2)
            WHERE id = $1 AND NOT ($2 = ANY(enrolled_courses))
            "#,
        )
        .bind(*student_id.as_uuid())
        .bind(*course_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("add_enrolled_course", e))?
        .rows_affected();

        if modified > 0 {
            return Ok(UpdateOutcome {
                matched: modified,
                modified,
            });
        }

        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM students WHERE id = $1)")
            .bind(*student_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("add_enrolled_course", e))?;

        Ok(UpdateOutcome {
            matched: u64::from(exists),
            modified: 0,
        })
    }
}
