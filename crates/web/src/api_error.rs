use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use services::{CatalogError, DashboardError, EnrollmentError, ProgressError, TutorError};

/// Failure of an API call, rendered as `{ "error": message }`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("validation: {0}")]
    Validation(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("upstream unavailable")]
    UpstreamUnavailable,
    #[error("unknown")]
    Unknown,
}

impl ApiError {
    /// Stable name of the error kind, used in logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated => "UNAUTHENTICATED",
            ApiError::Validation(_) => "VALIDATION",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            ApiError::Unknown => "UNKNOWN",
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::UpstreamUnavailable | ApiError::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::Unauthenticated => "Unauthorized",
            ApiError::Validation(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => msg,
            ApiError::UpstreamUnavailable => "Failed to get AI response",
            ApiError::Unknown => "Something went wrong",
        }
    }

    pub(crate) fn missing(field: &str) -> Self {
        ApiError::Validation(format!("{field} is required"))
    }

    /// Logs the underlying failure and hides it behind a generic message.
    pub(crate) fn internal(err: &dyn std::error::Error) -> Self {
        tracing::error!(error = %err, "request failed");
        ApiError::Unknown
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message(),
        }));

        (self.status(), body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::CourseNotFound => ApiError::NotFound("Course not found".into()),
            CatalogError::LessonNotFound => ApiError::NotFound("Lesson not found".into()),
            CatalogError::NotEnrolled => {
                ApiError::Forbidden("You need to enroll in this course".into())
            }
            other => ApiError::internal(&other),
        }
    }
}

impl From<EnrollmentError> for ApiError {
    fn from(err: EnrollmentError) -> Self {
        match err {
            EnrollmentError::CourseNotFound => ApiError::NotFound("Course not found".into()),
            EnrollmentError::AlreadyEnrolled => ApiError::Conflict("Already enrolled".into()),
            other => ApiError::internal(&other),
        }
    }
}

impl From<ProgressError> for ApiError {
    fn from(err: ProgressError) -> Self {
        match err {
            ProgressError::LessonNotFound => ApiError::NotFound("Lesson not found".into()),
            ProgressError::NotEnrolled => {
                ApiError::Forbidden("You need to enroll in this course".into())
            }
            other => ApiError::internal(&other),
        }
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        ApiError::internal(&err)
    }
}

impl From<TutorError> for ApiError {
    fn from(err: TutorError) -> Self {
        match err {
            TutorError::EmptyMessage => ApiError::missing("Message"),
            TutorError::NotFound => ApiError::NotFound("Course or lesson not found".into()),
            TutorError::Completion(inner) => {
                tracing::error!(error = %inner, "AI chat error");
                ApiError::UpstreamUnavailable
            }
            other => ApiError::internal(&other),
        }
    }
}
