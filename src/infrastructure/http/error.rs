//! Mapping of service errors onto HTTP responses

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::application::errors::ServiceError;
use crate::application::ports::outbound::AiError;

/// Error returned by route handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("Forbidden: {0}")]
    Forbidden(&'static str),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

/// RFC 7807 problem document used for server-side failures
#[derive(Serialize)]
struct ProblemDetails {
    #[serde(rename = "type")]
    kind: &'static str,
    title: &'static str,
    status: u16,
    detail: String,
}

fn error_body(status: StatusCode, error: &'static str, details: Option<String>) -> Response {
    let body = ErrorResponse {
        error,
        details,
        errors: Vec::new(),
    };
    (status, Json(body)).into_response()
}

fn problem(status: StatusCode, title: &'static str, detail: String) -> Response {
    let body = ProblemDetails {
        kind: "https://tools.ietf.org/html/rfc7231#section-6.6.1",
        title,
        status: status.as_u16(),
        detail,
    };
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/problem+json"),
    );
    response
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(msg) => {
                error_body(StatusCode::UNAUTHORIZED, "Unauthorized", Some(msg.to_string()))
            }
            ApiError::Forbidden(msg) => {
                error_body(StatusCode::FORBIDDEN, "Forbidden", Some(msg.to_string()))
            }
            ApiError::Service(ServiceError::NotFound(what)) => error_body(
                StatusCode::NOT_FOUND,
                "Not found",
                Some(format!("{} not found", what)),
            ),
            ApiError::Service(ServiceError::NotAllowed(msg)) => {
                error_body(StatusCode::FORBIDDEN, "Forbidden", Some(msg))
            }
            ApiError::Service(ServiceError::Validation(errors)) => {
                let body = ErrorResponse {
                    error: "Validation error",
                    details: None,
                    errors,
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::Service(ServiceError::Conflict(msg)) => {
                error_body(StatusCode::CONFLICT, "Conflict", Some(msg))
            }
            ApiError::Service(ServiceError::Ai(AiError::NotConfigured)) => error_body(
                StatusCode::SERVICE_UNAVAILABLE,
                "AI provider unavailable",
                Some(AiError::NotConfigured.to_string()),
            ),
            ApiError::Service(ServiceError::Ai(e)) => {
                tracing::error!(error = %e, "AI provider error");
                problem(StatusCode::BAD_GATEWAY, "AI provider error", e.to_string())
            }
            ApiError::Service(ServiceError::Repository(e)) => {
                tracing::error!(error = %e, "Repository error");
                problem(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred while processing your request.",
                    "Internal server error".to_string(),
                )
            }
        }
    }
}
