use std::sync::Arc;

use scholar_core::model::{CourseId, Enrollment, UserId};
use storage::repository::{CourseRepository, EnrollmentRepository, StorageError};
use tracing::info;

use crate::Clock;
use crate::error::EnrollmentError;

/// Creates enrollments.
#[derive(Clone)]
pub struct EnrollmentService {
    clock: Clock,
    courses: Arc<dyn CourseRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
}

impl EnrollmentService {
    #[must_use]
    pub fn new(
        clock: Clock,
        courses: Arc<dyn CourseRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
    ) -> Self {
        Self {
            clock,
            courses,
            enrollments,
        }
    }

    /// Enroll `user_id` in `course_id`.
    ///
    /// The uniqueness of (user, course) is left to the repository so that two
    /// concurrent requests cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns `EnrollmentError::CourseNotFound` for an unknown course,
    /// `EnrollmentError::AlreadyEnrolled` for a repeated enrollment, and
    /// `EnrollmentError::Storage` for other repository failures.
    pub async fn enroll(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Enrollment, EnrollmentError> {
        if self.courses.get_course(course_id).await?.is_none() {
            return Err(EnrollmentError::CourseNotFound);
        }

        let enrollment = self
            .enrollments
            .insert_enrollment(user_id, course_id, self.clock.now())
            .await
            .map_err(|e| match e {
                StorageError::Conflict => EnrollmentError::AlreadyEnrolled,
                StorageError::NotFound => EnrollmentError::CourseNotFound,
                other => EnrollmentError::Storage(other),
            })?;

        info!(%user_id, %course_id, enrollment_id = %enrollment.id, "enrolled");
        Ok(enrollment)
    }

    /// # Errors
    ///
    /// Returns `EnrollmentError::Storage` if repository access fails.
    pub async fn is_enrolled(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<bool, EnrollmentError> {
        Ok(self
            .enrollments
            .get_enrollment(user_id, course_id)
            .await?
            .is_some())
    }
}
