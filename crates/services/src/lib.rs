#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog_service;
pub mod dashboard_service;
pub mod enrollment_service;
pub mod error;
pub mod progress_service;
pub mod tutor;

pub use scholar_core::Clock;

pub use app_services::AppServices;
pub use catalog_service::{CatalogService, CourseDetail, LessonView};
pub use dashboard_service::{CourseCard, Dashboard, DashboardService};
pub use enrollment_service::EnrollmentService;
pub use error::{
    CatalogError, CompletionError, DashboardError, EnrollmentError, ProgressError, TutorError,
};
pub use progress_service::ProgressService;
pub use tutor::{
    CompletionClient, CompletionConfig, FALLBACK_REPLY, OpenAiCompletionClient, TutorService,
};
