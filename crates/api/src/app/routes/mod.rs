use axum::{routing::get, Router};

pub mod courses;
pub mod jobs;
pub mod students;
pub mod system;

/// Router for the record endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/courses", courses::router())
        .nest("/students", students::router())
        .route("/jobs/stats", get(jobs::stats))
}
