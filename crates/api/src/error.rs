//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`. Every error body is an RFC 9457 problem document
//! (`application/problem+json`).

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::{PatchError, ValidationErrors};

/// Problem type for 422 responses.
const VALIDATION_PROBLEM_TYPE: &str = "https://tools.ietf.org/html/rfc4918#section-11.2";
const VALIDATION_PROBLEM_TITLE: &str = "One or more validation errors occurred.";

/// Application-level error type for the customers API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Storage operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Request body failed field validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Request body is not acceptable JSON for the endpoint.
    #[error("Invalid JSON body: {0}")]
    Json(#[from] JsonRejection),

    /// Path parameter could not be parsed.
    #[error("Invalid path: {0}")]
    Path(#[from] PathRejection),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// RFC 9457 problem details body.
#[derive(Debug, Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationErrors>,
}

impl ProblemDetails {
    /// A problem for `status` with an optional human-readable detail.
    #[must_use]
    pub fn new(status: StatusCode, detail: Option<String>) -> Self {
        Self {
            kind: problem_type(status),
            title: status
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .to_string(),
            status: status.as_u16(),
            detail,
            errors: None,
        }
    }

    /// The 422 validation problem listing every failing field.
    #[must_use]
    pub fn validation(errors: ValidationErrors) -> Self {
        Self {
            kind: VALIDATION_PROBLEM_TYPE,
            title: VALIDATION_PROBLEM_TITLE.to_string(),
            status: StatusCode::UNPROCESSABLE_ENTITY.as_u16(),
            detail: None,
            errors: Some(errors),
        }
    }
}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            [(header::CONTENT_TYPE, "application/problem+json")],
            Json(self),
        )
            .into_response()
    }
}

fn problem_type(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "https://tools.ietf.org/html/rfc9110#section-15.5.1",
        StatusCode::NOT_FOUND => "https://tools.ietf.org/html/rfc9110#section-15.5.5",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "https://tools.ietf.org/html/rfc9110#section-15.5.16",
        StatusCode::UNPROCESSABLE_ENTITY => VALIDATION_PROBLEM_TYPE,
        _ if status.is_server_error() => "https://tools.ietf.org/html/rfc9110#section-15.6.1",
        _ => "about:blank",
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Repository(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::IdExhausted(_) => StatusCode::INTERNAL_SERVER_ERROR,
                RepositoryError::Patch(PatchError::TestFailed { .. }) => StatusCode::BAD_REQUEST,
                RepositoryError::Patch(PatchError::Invalid(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            },
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Json(rejection) => rejection.status(),
            Self::Path(rejection) => rejection.status(),
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let problem = match self {
            Self::Validation(errors)
            | Self::Repository(RepositoryError::Patch(PatchError::Invalid(errors))) => {
                ProblemDetails::validation(errors)
            }
            // Don't expose internal error details to clients
            _ if status.is_server_error() => {
                ProblemDetails::new(status, Some("Internal server error".to_string()))
            }
            Self::Repository(RepositoryError::NotFound) => {
                ProblemDetails::new(status, Some("Customer not found".to_string()))
            }
            Self::Repository(err) => ProblemDetails::new(status, Some(err.to_string())),
            Self::Json(rejection) => ProblemDetails::new(status, Some(rejection.body_text())),
            Self::Path(rejection) => ProblemDetails::new(status, Some(rejection.body_text())),
            Self::NotFound(msg) | Self::BadRequest(msg) => {
                ProblemDetails::new(status, Some(msg))
            }
        };

        problem.into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
