use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coursework_core::{CourseId, DomainError, DomainResult, Entity};

/// Course record, as persisted in the `courses` collection.
///
/// Courses are immutable once created; there is no update or delete path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub created_at: DateTime<Utc>,
}

/// Command: create a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCourse {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub instructor: String,
}

impl NewCourse {
    pub fn validate(&self) -> DomainResult<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("title cannot be empty"));
        }
        if self.instructor.trim().is_empty() {
            return Err(DomainError::validation("instructor cannot be empty"));
        }
        Ok(())
    }
}

impl Course {
    /// Validate the command and build the record with a freshly assigned id.
    ///
    /// The id is fixed here, before any persistence attempt, so a deferred
    /// insert can be reported back to the caller immediately.
    pub fn create(cmd: NewCourse, created_at: DateTime<Utc>) -> DomainResult<Self> {
        Self::create_with_id(CourseId::new(), cmd, created_at)
    }

    pub fn create_with_id(
        id: CourseId,
        cmd: NewCourse,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        cmd.validate()?;
        Ok(Self {
            id,
            title: cmd.title,
            description: cmd.description,
            instructor: cmd.instructor,
            created_at,
        })
    }
}

impl Entity for Course {
    type Id = CourseId;

    fn id(&self) -> CourseId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(title: &str, instructor: &str) -> NewCourse {
        NewCourse {
            title: title.to_string(),
            description: "intro".to_string(),
            instructor: instructor.to_string(),
        }
    }

    #[test]
    fn create_assigns_id_and_keeps_fields() {
        let now = Utc::now();
        let course = Course::create(cmd("CS101", "Hopper"), now).unwrap();

        assert_eq!(course.title, "CS101");
        assert_eq!(course.description, "intro");
        assert_eq!(course.instructor, "Hopper");
        assert_eq!(course.created_at, now);
        assert_eq!(Entity::id(&course), course.id);
    }

    #[test]
    fn create_rejects_empty_title() {
        let err = Course::create(cmd("   ", "Hopper"), Utc::now()).unwrap_err();
        assert_eq!(err, DomainError::validation("title cannot be empty"));
    }

    #[test]
    fn create_rejects_empty_instructor() {
        let err = Course::create(cmd("CS101", ""), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn description_defaults_to_empty_when_absent() {
        let cmd: NewCourse =
            serde_json::from_str(r#"{"title":"CS101","instructor":"Hopper"}"#).unwrap();
        assert_eq!(cmd.description, "");
        assert!(cmd.validate().is_ok());
    }

    #[test]
    fn document_layout_uses_snake_case_fields() {
        let course = Course::create(cmd("CS101", "Hopper"), Utc::now()).unwrap();
        let json = serde_json::to_value(&course).unwrap();

        for key in ["id", "title", "description", "instructor", "created_at"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
