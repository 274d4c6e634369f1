use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::json;

use coursework_catalog::{NewCourse, NewStudent};
use coursework_core::{CourseId, DomainError, StudentId};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

// Missing fields default to empty so they fail domain validation with a
// field-specific message instead of a generic JSON error.

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructor: String,
}

impl From<CreateCourseRequest> for NewCourse {
    fn from(req: CreateCourseRequest) -> Self {
        NewCourse {
            title: req.title,
            description: req.description,
            instructor: req.instructor,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateStudentRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl From<CreateStudentRequest> for NewStudent {
    fn from(req: CreateStudentRequest) -> Self {
        NewStudent {
            name: req.name,
            email: req.email,
        }
    }
}

// -------------------------
// Response bodies
// -------------------------

pub fn course_accepted(id: CourseId) -> serde_json::Value {
    json!({
        "message": "course creation accepted",
        "id": id.to_string(),
    })
}

pub fn enrollment_accepted(student_id: StudentId, course_id: CourseId) -> serde_json::Value {
    json!({
        "message": "enrollment accepted",
        "student_id": student_id.to_string(),
        "course_id": course_id.to_string(),
    })
}

// -------------------------
// Input helpers
// -------------------------

/// Unwrap a JSON body, turning every extractor rejection into a 400.
pub fn json_body<T>(
    body: Result<axum::Json<T>, JsonRejection>,
) -> Result<T, axum::response::Response> {
    body.map(|axum::Json(value)| value).map_err(|rejection| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
    })
}

pub fn parse_student_id(raw: &str) -> Result<StudentId, axum::response::Response> {
    raw.parse().map_err(|e: DomainError| errors::domain_error_to_response(e))
}

pub fn parse_course_id(raw: &str) -> Result<CourseId, axum::response::Response> {
    raw.parse().map_err(|e: DomainError| errors::domain_error_to_response(e))
}
