use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coursework_core::{CourseId, DomainError, DomainResult, Entity, StudentId};

/// Student record, as persisted in the `students` collection.
///
/// The enrolled set is only ever grown through [`Student::enroll`], which keeps
/// it free of duplicates no matter how often the same enrollment is replayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    id: StudentId,
    name: String,
    email: String,
    enrolled_courses: BTreeSet<CourseId>,
    created_at: DateTime<Utc>,
}

/// Command: register a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
}

impl NewStudent {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(DomainError::validation("email must look like user@domain")),
        }
    }
}

impl Student {
    /// Validate the command and build a student with an empty enrolled set.
    pub fn register(cmd: NewStudent, created_at: DateTime<Utc>) -> DomainResult<Self> {
        cmd.validate()?;
        Ok(Self {
            id: StudentId::new(),
            name: cmd.name,
            email: cmd.email,
            enrolled_courses: BTreeSet::new(),
            created_at,
        })
    }

    /// Rebuild a student from persisted columns.
    pub fn restore(
        id: StudentId,
        name: String,
        email: String,
        enrolled_courses: impl IntoIterator<Item = CourseId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            enrolled_courses: enrolled_courses.into_iter().collect(),
            created_at,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn enrolled_courses(&self) -> &BTreeSet<CourseId> {
        &self.enrolled_courses
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_enrolled(&self, course_id: CourseId) -> bool {
        self.enrolled_courses.contains(&course_id)
    }

    /// Add a course to the enrolled set.
    ///
    /// Returns `false` when the course was already present (nothing changed).
    pub fn enroll(&mut self, course_id: CourseId) -> bool {
        self.enrolled_courses.insert(course_id)
    }
}

impl Entity for Student {
    type Id = StudentId;

    fn id(&self) -> StudentId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> Student {
        Student::register(
            NewStudent {
                name: "Ada".to_string(),
                email: "a@x.com".to_string(),
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn register_starts_with_empty_enrollment() {
        let student = ada();
        assert_eq!(student.name(), "Ada");
        assert_eq!(student.email(), "a@x.com");
        assert!(student.enrolled_courses().is_empty());
    }

    #[test]
    fn register_rejects_blank_name() {
        let err = Student::register(
            NewStudent {
                name: " ".to_string(),
                email: "a@x.com".to_string(),
            },
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, DomainError::validation("name cannot be empty"));
    }

    #[test]
    fn register_rejects_malformed_email() {
        for email in ["", "ada", "@x.com", "ada@"] {
            let cmd = NewStudent {
                name: "Ada".to_string(),
                email: email.to_string(),
            };
            assert!(cmd.validate().is_err(), "accepted {email:?}");
        }
    }

    #[test]
    fn register_keeps_submitted_fields_verbatim() {
        let student = Student::register(
            NewStudent {
                name: " Ada Lovelace ".to_string(),
                email: " ada@example.com ".to_string(),
            },
            Utc::now(),
        )
        .unwrap();

        assert_eq!(student.name(), " Ada Lovelace ");
        assert_eq!(student.email(), " ada@example.com ");
    }

    #[test]
    fn enroll_twice_keeps_one_entry() {
        let mut student = ada();
        let course = CourseId::new();

        assert!(student.enroll(course));
        assert!(!student.enroll(course));
        assert_eq!(student.enrolled_courses().len(), 1);
        assert!(student.is_enrolled(course));
    }

    #[test]
    fn enrolled_courses_serialize_as_array() {
        let mut student = ada();
        let course = CourseId::new();
        student.enroll(course);

        let json = serde_json::to_value(&student).unwrap();
        assert_eq!(
            json["enrolled_courses"],
            serde_json::json!([course.to_string()])
        );
    }

    #[test]
    fn restore_dedupes_persisted_ids() {
        let course = CourseId::new();
        let student = Student::restore(
            StudentId::new(),
            "Ada".to_string(),
            "a@x.com".to_string(),
            vec![course, course],
            Utc::now(),
        );
        assert_eq!(student.enrolled_courses().len(), 1);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: any sequence of enrollments (with repeats) yields exactly
            /// the set of distinct course ids.
            #[test]
            fn enrollment_is_set_union(picks in proptest::collection::vec(0usize..5, 0..40)) {
                let courses: Vec<CourseId> = (0..5).map(|_| CourseId::new()).collect();
                let mut student = ada();

                for i in &picks {
                    student.enroll(courses[*i]);
                }

                let expected: BTreeSet<CourseId> = picks.iter().map(|i| courses[*i]).collect();
                prop_assert_eq!(student.enrolled_courses(), &expected);
            }

            /// Property: enrollment order does not matter.
            #[test]
            fn enrollment_is_commutative(picks in proptest::collection::vec(0usize..5, 0..20)) {
                let courses: Vec<CourseId> = (0..5).map(|_| CourseId::new()).collect();
                let mut forward = ada();
                let mut backward = forward.clone();

                for i in &picks {
                    forward.enroll(courses[*i]);
                }
                for i in picks.iter().rev() {
                    backward.enroll(courses[*i]);
                }

                prop_assert_eq!(forward, backward);
            }
        }
    }
}
