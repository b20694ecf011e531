use std::sync::Arc;

use scholar_core::model::{CourseId, LessonId, LessonProgress, UserId};
use storage::repository::{EnrollmentRepository, LessonRepository, ProgressRepository};
use tracing::info;

use crate::Clock;
use crate::error::ProgressError;

/// Records lesson completions.
///
/// A progress row is only ever written for a lesson of a course the learner
/// is enrolled in.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    lessons: Arc<dyn LessonRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        clock: Clock,
        lessons: Arc<dyn LessonRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            clock,
            lessons,
            enrollments,
            progress,
        }
    }

    /// Mark a lesson complete. Repeating the call returns the stored row
    /// unchanged, including its first `completed_at`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::LessonNotFound` if the lesson does not exist in
    /// `course_id`, `ProgressError::NotEnrolled` without an enrollment, and
    /// `ProgressError::Storage` if repository access fails.
    pub async fn complete_lesson(
        &self,
        user_id: UserId,
        course_id: CourseId,
        lesson_id: LessonId,
    ) -> Result<LessonProgress, ProgressError> {
        let lesson = self
            .lessons
            .get_lesson(lesson_id)
            .await?
            .filter(|lesson| lesson.course_id() == course_id)
            .ok_or(ProgressError::LessonNotFound)?;

        if self
            .enrollments
            .get_enrollment(user_id, course_id)
            .await?
            .is_none()
        {
            return Err(ProgressError::NotEnrolled);
        }

        let row = LessonProgress::completed_now(user_id, course_id, lesson.id(), self.clock.now());
        let stored = self.progress.mark_completed(&row).await?;
        info!(%user_id, %course_id, %lesson_id, "lesson completed");
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use scholar_core::model::{CourseDraft, CourseLevel, Lesson, LessonDraft};
    use scholar_core::time::fixed_now;
    use storage::repository::Storage;

    async fn setup(clock: Clock) -> (Storage, ProgressService, CourseId) {
        let storage = Storage::in_memory();
        let course_id = storage
            .courses
            .insert_course(
                &CourseDraft {
                    title: "Networking".into(),
                    description: String::new(),
                    instructor_id: UserId::new(9),
                    category: None,
                    level: CourseLevel::Beginner,
                    duration_hours: 2,
                    published: true,
                },
                fixed_now(),
            )
            .await
            .unwrap();
        let lesson = Lesson::new(
            LessonId::new(1),
            LessonDraft {
                course_id,
                title: "Sockets".into(),
                description: String::new(),
                content: String::new(),
                position: 1,
                duration_minutes: 20,
                is_free: false,
            },
        )
        .unwrap();
        storage.lessons.upsert_lesson(&lesson).await.unwrap();
        let service = ProgressService::new(
            clock,
            Arc::clone(&storage.lessons),
            Arc::clone(&storage.enrollments),
            Arc::clone(&storage.progress),
        );
        (storage, service, course_id)
    }

    #[tokio::test]
    async fn completing_requires_enrollment() {
        let (_storage, service, course_id) = setup(Clock::fixed(fixed_now())).await;
        let err = service
            .complete_lesson(UserId::new(1), course_id, LessonId::new(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressError::NotEnrolled));
    }

    #[tokio::test]
    async fn completing_twice_keeps_first_timestamp() {
        let (storage, service, course_id) = setup(Clock::fixed(fixed_now())).await;
        let user = UserId::new(1);
        storage
            .enrollments
            .insert_enrollment(user, course_id, fixed_now())
            .await
            .unwrap();

        let first = service
            .complete_lesson(user, course_id, LessonId::new(1))
            .await
            .unwrap();
        assert_eq!(first.completed_at, Some(fixed_now()));

        let later = ProgressService::new(
            Clock::fixed(fixed_now() + Duration::days(1)),
            Arc::clone(&storage.lessons),
            Arc::clone(&storage.enrollments),
            Arc::clone(&storage.progress),
        );
        let again = later
            .complete_lesson(user, course_id, LessonId::new(1))
            .await
            .unwrap();
        assert_eq!(again.completed_at, Some(fixed_now()));
        assert_eq!(storage.progress.list_completed(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn lesson_must_belong_to_course() {
        let (_storage, service, _) = setup(Clock::fixed(fixed_now())).await;
        let err = service
            .complete_lesson(UserId::new(1), CourseId::new(500), LessonId::new(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressError::LessonNotFound));
    }
}
