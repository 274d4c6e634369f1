use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_student))
        .route("/:id", get(get_student))
        .route("/:id/enroll/:course_id", post(enroll_student))
}

pub async fn create_student(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateStudentRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match dto::json_body(body) {
        Ok(b) => b,
        Err(res) => return res,
    };

    match services.create_student(body.into()).await {
        Ok(student) => (StatusCode::CREATED, Json(student)).into_response(),
        Err(e) => errors::service_error_to_response(e, services.enqueue_timeout_secs()),
    }
}

pub async fn get_student(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_student_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.get_student(id).await {
        Ok(student) => (StatusCode::OK, Json(student)).into_response(),
        Err(e) => errors::service_error_to_response(e, services.enqueue_timeout_secs()),
    }
}

/// Queue an enrollment. Unknown students or courses only show up as failed jobs.
pub async fn enroll_student(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, course_id)): Path<(String, String)>,
) -> axum::response::Response {
    let student_id = match dto::parse_student_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let course_id = match dto::parse_course_id(&course_id) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.enroll(student_id, course_id).await {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(dto::enrollment_accepted(student_id, course_id)),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e, services.enqueue_timeout_secs()),
    }
}
