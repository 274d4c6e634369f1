use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/", post(create_course).get(list_courses))
}

/// Validate and queue a course. The insert happens on a worker.
pub async fn create_course(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateCourseRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match dto::json_body(body) {
        Ok(b) => b,
        Err(res) => return res,
    };

    match services.create_course(body.into()).await {
        Ok(id) => (StatusCode::ACCEPTED, Json(dto::course_accepted(id))).into_response(),
        Err(e) => errors::service_error_to_response(e, services.enqueue_timeout_secs()),
    }
}

pub async fn list_courses(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.list_courses().await {
        Ok(courses) => (StatusCode::OK, Json(courses)).into_response(),
        Err(e) => errors::service_error_to_response(e, services.enqueue_timeout_secs()),
    }
}
