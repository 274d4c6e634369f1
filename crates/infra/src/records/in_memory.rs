use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use coursework_catalog::{Course, Student};
use coursework_core::{CourseId, Entity, StudentId};

use super::store::{RecordStore, StoreError, UpdateOutcome};

/// In-memory record store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    courses: RwLock<HashMap<CourseId, Course>>,
    students: RwLock<HashMap<StudentId, Student>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(collection: &str) -> StoreError {
    StoreError::Storage(format!("{collection} lock poisoned"))
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert_course(&self, course: &Course) -> Result<(), StoreError> {
        let mut courses = self.courses.write().map_err(|_| poisoned("courses"))?;
        if courses.contains_key(&course.id()) {
            return Err(StoreError::Duplicate(format!("course {}", course.id())));
        }
        courses.insert(course.id(), course.clone());
        Ok(())
    }

    async fn find_course(&self, id: CourseId) -> Result<Option<Course>, StoreError> {
        let courses = self.courses.read().map_err(|_| poisoned("courses"))?;
        Ok(courses.get(&id).cloned())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        let courses = self.courses.read().map_err(|_| poisoned("courses"))?;
        let mut all: Vec<Course> = courses.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn insert_student(&self, student: &Student) -> Result<(), StoreError> {
        let mut students = self.students.write().map_err(|_| poisoned("students"))?;
        if students.contains_key(&student.id()) {
            return Err(StoreError::Duplicate(format!("student {}", student.id())));
        }
        students.insert(student.id(), student.clone());
        Ok(())
    }

    async fn find_student(&self, id: StudentId) -> Result<Option<Student>, StoreError> {
        let students = self.students.read().map_err(|_| poisoned("students"))?;
        Ok(students.get(&id).cloned())
    }

    async fn add_enrolled_course(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<UpdateOutcome, StoreError> {
        // Check-and-insert happens under one write guard.
        let mut students = self.students.write().map_err(|_| poisoned("students"))?;
        match students.get_mut(&student_id) {
            Some(student) => {
                let changed = student.enroll(course_id);
                Ok(UpdateOutcome {
                    matched: 1,
                    modified: u64::from(changed),
                })
            }
            None => Ok(UpdateOutcome::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use coursework_catalog::{NewCourse, NewStudent};

    use super::*;

    fn course(title: &str) -> Course {
        Course::create(
            NewCourse {
                title: title.to_string(),
                description: String::new(),
                instructor: "Hopper".to_string(),
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn student() -> Student {
        Student::register(
            NewStudent {
                name: "Ada".to_string(),
                email: "a@x.com".to_string(),
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn insert_then_find_course() {
        let store = InMemoryRecordStore::new();
        let c = course("CS101");
        store.insert_course(&c).await.unwrap();

        assert_eq!(store.find_course(c.id).await.unwrap(), Some(c));
        assert_eq!(store.find_course(CourseId::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_course_id_is_rejected() {
        let store = InMemoryRecordStore::new();
        let c = course("CS101");
        store.insert_course(&c).await.unwrap();

        let err = store.insert_course(&c).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert_eq!(store.list_courses().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_courses_is_ordered_by_creation() {
        let store = InMemoryRecordStore::new();
        let mut older = course("old");
        older.created_at = Utc::now() - Duration::hours(1);
        let newer = course("new");

        store.insert_course(&newer).await.unwrap();
        store.insert_course(&older).await.unwrap();

        let titles: Vec<String> = store
            .list_courses()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["old", "new"]);
    }

    #[tokio::test]
    async fn add_to_set_reports_matched_and_modified() {
        let store = InMemoryRecordStore::new();
        let s = student();
        store.insert_student(&s).await.unwrap();
        let c = CourseId::new();

        let first = store.add_enrolled_course(s.id(), c).await.unwrap();
        assert_eq!(first, UpdateOutcome { matched: 1, modified: 1 });

        let second = store.add_enrolled_course(s.id(), c).await.unwrap();
        assert_eq!(second, UpdateOutcome { matched: 1, modified: 0 });

        let stored = store.find_student(s.id()).await.unwrap().unwrap();
        assert_eq!(stored.enrolled_courses().len(), 1);
    }

    #[tokio::test]
    async fn add_to_set_on_missing_student_matches_nothing() {
        let store = InMemoryRecordStore::new();
        let outcome = store
            .add_enrolled_course(StudentId::new(), CourseId::new())
            .await
            .unwrap();
        assert_eq!(outcome.matched, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_add_to_set_keeps_single_entry() {
        let store = Arc::new(InMemoryRecordStore::new());
        let s = student();
        store.insert_student(&s).await.unwrap();
        let c = CourseId::new();

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            let id = s.id();
            tasks.push(tokio::spawn(async move {
                store.add_enrolled_course(id, c).await.unwrap()
            }));
        }

        let mut modified = 0;
        for t in tasks {
            modified += t.await.unwrap().modified;
        }

        assert_eq!(modified, 1);
        let stored = store.find_student(s.id()).await.unwrap().unwrap();
        assert_eq!(stored.enrolled_courses().iter().collect::<Vec<_>>(), vec![&c]);
    }
}
