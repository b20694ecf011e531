use std::sync::Arc;

use scholar_core::aggregate::{Completion, ProgressSummary, aggregate};
use scholar_core::model::{Course, EnrolledCourse, Enrollment, UserId};
use storage::repository::{EnrollmentRepository, ProgressRepository};

use crate::error::DashboardError;

/// An enrolled course with the learner's completion of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseCard {
    pub enrollment: Enrollment,
    pub course: Course,
    pub completion: Completion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    /// Enrollments, most recent first.
    pub courses: Vec<CourseCard>,
    pub overall: Completion,
    pub completed_courses: u32,
}

impl Dashboard {
    #[must_use]
    pub fn enrolled_count(&self) -> usize {
        self.courses.len()
    }
}

/// Learner-facing progress views. Both views fetch the enrollments and the
/// completed rows once and hand them to the aggregator.
#[derive(Clone)]
pub struct DashboardService {
    enrollments: Arc<dyn EnrollmentRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl DashboardService {
    #[must_use]
    pub fn new(
        enrollments: Arc<dyn EnrollmentRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            enrollments,
            progress,
        }
    }

    /// # Errors
    ///
    /// Returns `DashboardError::Storage` if repository access fails.
    pub async fn dashboard(&self, user_id: UserId) -> Result<Dashboard, DashboardError> {
        let (courses, summary) = self.load(user_id).await?;
        Ok(Dashboard {
            courses,
            overall: summary.overall,
            completed_courses: summary.completed_courses,
        })
    }

    /// Enrollments, most recent first, each with its completion.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Storage` if repository access fails.
    pub async fn my_courses(&self, user_id: UserId) -> Result<Vec<CourseCard>, DashboardError> {
        let (courses, _) = self.load(user_id).await?;
        Ok(courses)
    }

    async fn load(
        &self,
        user_id: UserId,
    ) -> Result<(Vec<CourseCard>, ProgressSummary), DashboardError> {
        let listings = self.enrollments.list_for_user(user_id).await?;
        let done = self.progress.list_completed(user_id).await?;

        let enrolled: Vec<EnrolledCourse> = listings
            .iter()
            .map(|l| EnrolledCourse {
                course_id: l.course.id(),
                total_lessons: l.lesson_count,
            })
            .collect();
        let summary = aggregate(&enrolled, &done);

        // Storage guarantees one enrollment per course, so the summary rows
        // line up with the listings one to one.
        let courses = listings
            .into_iter()
            .zip(summary.courses.iter())
            .map(|(listing, row)| CourseCard {
                enrollment: listing.enrollment,
                course: listing.course,
                completion: row.completion,
            })
            .collect();

        Ok((courses, summary))
    }
}
