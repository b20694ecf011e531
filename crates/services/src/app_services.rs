use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::catalog_service::CatalogService;
use crate::dashboard_service::DashboardService;
use crate::enrollment_service::EnrollmentService;
use crate::progress_service::ProgressService;
use crate::tutor::{CompletionClient, TutorService};

/// Assembles the request-facing services over one `Storage`.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<CatalogService>,
    enrollment: Arc<EnrollmentService>,
    progress: Arc<ProgressService>,
    dashboard: Arc<DashboardService>,
    tutor: Arc<TutorService>,
}

impl AppServices {
    /// Wires every service onto `storage`. Services share the same repositories.
    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        clock: Clock,
        completion: Arc<dyn CompletionClient>,
    ) -> Self {
        let catalog = Arc::new(CatalogService::new(
            Arc::clone(&storage.courses),
            Arc::clone(&storage.lessons),
            Arc::clone(&storage.enrollments),
            Arc::clone(&storage.progress),
        ));
        let enrollment = Arc::new(EnrollmentService::new(
            clock,
            Arc::clone(&storage.courses),
            Arc::clone(&storage.enrollments),
        ));
        let progress = Arc::new(ProgressService::new(
            clock,
            Arc::clone(&storage.lessons),
            Arc::clone(&storage.enrollments),
            Arc::clone(&storage.progress),
        ));
        let dashboard = Arc::new(DashboardService::new(
            Arc::clone(&storage.enrollments),
            Arc::clone(&storage.progress),
        ));
        let tutor = Arc::new(TutorService::new(
            completion,
            Arc::clone(&storage.courses),
            Arc::clone(&storage.lessons),
        ));

        Self {
            catalog,
            enrollment,
            progress,
            dashboard,
            tutor,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn enrollment(&self) -> Arc<EnrollmentService> {
        Arc::clone(&self.enrollment)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard)
    }

    #[must_use]
    pub fn tutor(&self) -> Arc<TutorService> {
        Arc::clone(&self.tutor)
    }
}
