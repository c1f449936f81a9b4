//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;
use crate::services::face::FaceVerifyError;
use crate::services::{CheckInError, ServiceError};

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest(String),
    /// Duplicate marking or other uniqueness conflict
    Conflict(String),
    /// Declined computation (e.g. too few samples)
    Unprocessable(String),
    /// Upstream collaborator failure (face service)
    Upstream(String),
    /// Internal server error
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ApiError::new("CONFLICT", msg)),
            AppError::Unprocessable(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("INSUFFICIENT_DATA", msg),
            ),
            AppError::Upstream(msg) => (
                StatusCode::BAD_GATEWAY,
                ApiError::new("UPSTREAM_FAILURE", msg),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
        };

        (status, Json(error)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match &err {
            RepositoryError::NotFound { .. } => AppError::NotFound(err.to_string()),
            RepositoryError::Conflict { .. } => AppError::Conflict(err.to_string()),
            RepositoryError::ValidationError { .. } => AppError::BadRequest(err.to_string()),
            _ => AppError::Internal(err.to_string()),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::ClassNotFound(_) | ServiceError::StudentNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            ServiceError::NoSessionOnDate { .. } => AppError::BadRequest(err.to_string()),
            ServiceError::SessionNotFinished { .. } => AppError::Conflict(err.to_string()),
            ServiceError::InsufficientData { .. } => AppError::Unprocessable(err.to_string()),
            ServiceError::Repository(e) => e.into(),
        }
    }
}

impl From<CheckInError> for AppError {
    fn from(err: CheckInError) -> Self {
        match err {
            CheckInError::StudentNotFound(_) | CheckInError::ClassNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            CheckInError::NotEnrolled { .. } | CheckInError::NoSessionToday { .. } => {
                AppError::BadRequest(err.to_string())
            }
            CheckInError::AlreadyMarked => AppError::Conflict(err.to_string()),
            CheckInError::FaceVerificationFailed { ref source } => match source {
                // Unreachable service is an upstream failure the caller may
                // retry; a negative verdict is a plain rejection.
                Some(FaceVerifyError::Unavailable(_)) => AppError::Upstream(err.to_string()),
                _ => AppError::BadRequest(err.to_string()),
            },
            CheckInError::Repository(e) => e.into(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
