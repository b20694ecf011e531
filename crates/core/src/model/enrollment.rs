use chrono::{DateTime, Utc};

use crate::model::ids::{CourseId, EnrollmentId, UserId};

/// A learner's membership in a course. At most one per (user, course).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub user_id: UserId,
    pub course_id: CourseId,
    pub enrolled_at: DateTime<Utc>,
}

/// An enrollment joined with the lesson count of its course.
///
/// This is the shape the progress aggregator consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrolledCourse {
    pub course_id: CourseId,
    pub total_lessons: u32,
}
