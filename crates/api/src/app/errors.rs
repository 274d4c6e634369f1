use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use serde_json::json;

use coursework_core::DomainError;
use coursework_infra::{jobs::EnqueueError, records::StoreError};

use crate::app::services::ServiceError;

pub fn service_error_to_response(err: ServiceError, retry_after_secs: u64) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Store(e) => store_error_to_response(e),
        ServiceError::Enqueue(e) => enqueue_error_to_response(e, retry_after_secs),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound(what) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
        }
    }
}

fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::Duplicate(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        StoreError::Storage(msg) => {
            tracing::error!(error = %msg, "record store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

fn enqueue_error_to_response(err: EnqueueError, retry_after_secs: u64) -> axum::response::Response {
    let code = match err {
        EnqueueError::QueueFull { .. } => "queue_full",
        EnqueueError::Closed => "queue_closed",
    };
    tracing::warn!(error = %err, "job rejected");

    let mut response = json_error(StatusCode::SERVICE_UNAVAILABLE, code, err.to_string());
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
    response
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
