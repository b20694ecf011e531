use chrono::{DateTime, Utc};

use crate::model::ids::{CourseId, LessonId, UserId};

/// Completion state of one lesson for one learner.
///
/// `completed_at` is written the first time the lesson is completed and never
/// moves afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonProgress {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub lesson_id: LessonId,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl LessonProgress {
    /// A fresh record for a lesson that was just completed.
    #[must_use]
    pub fn completed_now(
        user_id: UserId,
        course_id: CourseId,
        lesson_id: LessonId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            course_id,
            lesson_id,
            completed: true,
            completed_at: Some(now),
        }
    }

    /// Marks the lesson complete. Re-marking keeps the original timestamp.
    pub fn mark_completed(&mut self, now: DateTime<Utc>) {
        self.completed = true;
        self.completed_at.get_or_insert(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn re_marking_keeps_first_timestamp() {
        let first = fixed_now();
        let mut progress = LessonProgress::completed_now(
            UserId::new(1),
            CourseId::new(1),
            LessonId::new(1),
            first,
        );
        progress.mark_completed(first + Duration::hours(3));
        assert!(progress.completed);
        assert_eq!(progress.completed_at, Some(first));
    }

    #[test]
    fn marking_an_incomplete_row_sets_timestamp() {
        let mut progress = LessonProgress {
            user_id: UserId::new(1),
            course_id: CourseId::new(1),
            lesson_id: LessonId::new(2),
            completed: false,
            completed_at: None,
        };
        progress.mark_completed(fixed_now());
        assert_eq!(progress.completed_at, Some(fixed_now()));
    }
}
