//! Shared error types for the services crate.

use thiserror::Error;

use scholar_core::model::LessonError;
use storage::repository::StorageError;

/// Errors emitted by a `CompletionClient`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompletionError {
    #[error("completion service is not configured")]
    Disabled,
    #[error("invalid completion base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("unsupported completion base url scheme: {0}")]
    UnsupportedScheme(String),
    #[error("completion request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("course not found")]
    CourseNotFound,
    #[error("lesson not found")]
    LessonNotFound,
    #[error("enrollment required to view this lesson")]
    NotEnrolled,
    #[error(transparent)]
    Outline(#[from] LessonError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `EnrollmentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EnrollmentError {
    #[error("course not found")]
    CourseNotFound,
    #[error("already enrolled in this course")]
    AlreadyEnrolled,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("lesson not found")]
    LessonNotFound,
    #[error("not enrolled in this course")]
    NotEnrolled,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `DashboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DashboardError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `TutorService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TutorError {
    #[error("message is required")]
    EmptyMessage,
    #[error("course or lesson not found")]
    NotFound,
    #[error(transparent)]
    Completion(#[from] CompletionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
