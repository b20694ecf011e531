use std::sync::Arc;

use scholar_core::aggregate::{Completion, aggregate};
use scholar_core::model::{
    Course, CourseId, CourseOutline, EnrolledCourse, Enrollment, Lesson, LessonId, UserId,
};
use storage::repository::{
    CourseListing, CourseRepository, EnrollmentRepository, LessonRepository, ProgressRepository,
};
use tracing::debug;

use crate::error::CatalogError;

/// Upper bound on catalog rows returned in one listing.
pub const CATALOG_LIMIT: u32 = 100;

/// A course page: ordered lessons plus what the viewer has done so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDetail {
    pub course: Course,
    pub outline: CourseOutline,
    pub enrollment_count: u32,
    pub enrollment: Option<Enrollment>,
    pub completed_lesson_ids: Vec<LessonId>,
    /// Present only for enrolled viewers.
    pub completion: Option<Completion>,
}

impl CourseDetail {
    #[must_use]
    pub fn is_enrolled(&self) -> bool {
        self.enrollment.is_some()
    }
}

/// A single lesson in the context of its course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonView {
    pub course: Course,
    pub lesson: Lesson,
    /// 1-based position among the course's lessons.
    pub ordinal: usize,
    pub lesson_count: usize,
    pub previous_lesson_id: Option<LessonId>,
    pub next_lesson_id: Option<LessonId>,
    pub enrolled: bool,
    pub completed: bool,
}

/// Read-side queries over courses and lessons.
#[derive(Clone)]
pub struct CatalogService {
    courses: Arc<dyn CourseRepository>,
    lessons: Arc<dyn LessonRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl CatalogService {
    #[must_use]
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        lessons: Arc<dyn LessonRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            courses,
            lessons,
            enrollments,
            progress,
        }
    }

    /// Published courses, newest first, with lesson and enrollment counts.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn list_catalog(&self) -> Result<Vec<CourseListing>, CatalogError> {
        Ok(self.courses.list_published(CATALOG_LIMIT).await?)
    }

    /// Load a course with its ordered lessons. When `viewer` is given, the
    /// detail also carries their enrollment and completed lessons.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::CourseNotFound` for an unknown course,
    /// `CatalogError::Outline` if stored lessons violate ordering rules, and
    /// `CatalogError::Storage` if repository access fails.
    pub async fn course_detail(
        &self,
        course_id: CourseId,
        viewer: Option<UserId>,
    ) -> Result<CourseDetail, CatalogError> {
        let (course, outline) = self.load_outline(course_id).await?;
        let enrollment_count = self.courses.enrollment_count(course_id).await?;

        let (enrollment, completed_lesson_ids, completion) = match viewer {
            Some(user_id) => {
                let enrollment = self.enrollments.get_enrollment(user_id, course_id).await?;
                let done = self
                    .progress
                    .list_completed_in_course(user_id, course_id)
                    .await?;
                let completed_lesson_ids = done.iter().map(|p| p.lesson_id).collect();
                let completion = enrollment.as_ref().map(|_| {
                    let enrolled = EnrolledCourse {
                        course_id,
                        total_lessons: u32::try_from(outline.len()).unwrap_or(u32::MAX),
                    };
                    aggregate(&[enrolled], &done).overall
                });
                (enrollment, completed_lesson_ids, completion)
            }
            None => (None, Vec::new(), None),
        };

        Ok(CourseDetail {
            course,
            outline,
            enrollment_count,
            enrollment,
            completed_lesson_ids,
            completion,
        })
    }

    /// Open a lesson for `user_id`. Enrollment is required unless the lesson
    /// is a free preview.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::CourseNotFound` / `CatalogError::LessonNotFound`
    /// when the course or lesson is unknown (or the lesson belongs to another
    /// course), `CatalogError::NotEnrolled` when access is denied, and
    /// `CatalogError::Storage` if repository access fails.
    pub async fn lesson_view(
        &self,
        user_id: UserId,
        course_id: CourseId,
        lesson_id: LessonId,
    ) -> Result<LessonView, CatalogError> {
        let (course, outline) = self.load_outline(course_id).await?;
        let lesson = outline
            .get(lesson_id)
            .cloned()
            .ok_or(CatalogError::LessonNotFound)?;
        let ordinal = outline
            .ordinal_of(lesson_id)
            .ok_or(CatalogError::LessonNotFound)?;

        let enrolled = self
            .enrollments
            .get_enrollment(user_id, course_id)
            .await?
            .is_some();
        if !enrolled && !lesson.is_free() {
            debug!(%user_id, %course_id, %lesson_id, "lesson access denied");
            return Err(CatalogError::NotEnrolled);
        }

        let completed = self
            .progress
            .get_progress(user_id, lesson_id)
            .await?
            .is_some_and(|p| p.completed);
        let (previous, next) = outline.neighbors(lesson_id);

        Ok(LessonView {
            previous_lesson_id: previous.map(Lesson::id),
            next_lesson_id: next.map(Lesson::id),
            lesson_count: outline.len(),
            course,
            lesson,
            ordinal,
            enrolled,
            completed,
        })
    }

    async fn load_outline(
        &self,
        course_id: CourseId,
    ) -> Result<(Course, CourseOutline), CatalogError> {
        let course = self
            .courses
            .get_course(course_id)
            .await?
            .ok_or(CatalogError::CourseNotFound)?;
        let lessons = self.lessons.list_lessons(course_id).await?;
        let outline = CourseOutline::new(course_id, lessons)?;
        Ok((course, outline))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholar_core::model::{CourseDraft, CourseLevel, LessonDraft, LessonProgress};
    use scholar_core::time::fixed_now;
    use storage::repository::Storage;

    async fn seeded() -> (Storage, CatalogService, CourseId) {
        let storage = Storage::in_memory();
        let course_id = storage
            .courses
            .insert_course(
                &CourseDraft {
                    title: "Rust".into(),
                    description: "Ownership and friends".into(),
                    instructor_id: UserId::new(100),
                    category: None,
                    level: CourseLevel::Beginner,
                    duration_hours: 3,
                    published: true,
                },
                fixed_now(),
            )
            .await
            .unwrap();
        for (id, position, is_free) in [(1, 1, true), (2, 2, false), (3, 3, false)] {
            let lesson = Lesson::new(
                LessonId::new(id),
                LessonDraft {
                    course_id,
                    title: format!("Lesson {position}"),
                    description: String::new(),
                    content: "<p>text</p>".into(),
                    position,
                    duration_minutes: 10,
                    is_free,
                },
            )
            .unwrap();
            storage.lessons.upsert_lesson(&lesson).await.unwrap();
        }
        let service = CatalogService::new(
            Arc::clone(&storage.courses),
            Arc::clone(&storage.lessons),
            Arc::clone(&storage.enrollments),
            Arc::clone(&storage.progress),
        );
        (storage, service, course_id)
    }

    #[tokio::test]
    async fn detail_for_anonymous_viewer_has_no_progress() {
        let (_storage, service, course_id) = seeded().await;
        let detail = service.course_detail(course_id, None).await.unwrap();
        assert_eq!(detail.outline.len(), 3);
        assert!(!detail.is_enrolled());
        assert!(detail.completed_lesson_ids.is_empty());
        assert!(detail.completion.is_none());
    }

    #[tokio::test]
    async fn detail_for_enrolled_viewer_reports_completion() {
        let (storage, service, course_id) = seeded().await;
        let user = UserId::new(1);
        storage
            .enrollments
            .insert_enrollment(user, course_id, fixed_now())
            .await
            .unwrap();
        storage
            .progress
            .mark_completed(&LessonProgress::completed_now(
                user,
                course_id,
                LessonId::new(2),
                fixed_now(),
            ))
            .await
            .unwrap();

        let detail = service.course_detail(course_id, Some(user)).await.unwrap();
        assert!(detail.is_enrolled());
        assert_eq!(detail.enrollment_count, 1);
        assert_eq!(detail.completed_lesson_ids, vec![LessonId::new(2)]);
        assert_eq!(detail.completion.unwrap().percent, 33);
    }

    #[tokio::test]
    async fn unknown_course_is_not_found() {
        let (_storage, service, _) = seeded().await;
        let err = service
            .course_detail(CourseId::new(42), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::CourseNotFound));
    }

    #[tokio::test]
    async fn free_preview_is_open_without_enrollment() {
        let (_storage, service, course_id) = seeded().await;
        let view = service
            .lesson_view(UserId::new(5), course_id, LessonId::new(1))
            .await
            .unwrap();
        assert_eq!(view.ordinal, 1);
        assert_eq!(view.lesson_count, 3);
        assert_eq!(view.previous_lesson_id, None);
        assert_eq!(view.next_lesson_id, Some(LessonId::new(2)));
        assert!(!view.enrolled);
    }

    #[tokio::test]
    async fn paid_lesson_requires_enrollment() {
        let (storage, service, course_id) = seeded().await;
        let user = UserId::new(5);
        let err = service
            .lesson_view(user, course_id, LessonId::new(2))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotEnrolled));

        storage
            .enrollments
            .insert_enrollment(user, course_id, fixed_now())
            .await
            .unwrap();
        let view = service
            .lesson_view(user, course_id, LessonId::new(3))
            .await
            .unwrap();
        assert_eq!(view.ordinal, 3);
        assert_eq!(view.previous_lesson_id, Some(LessonId::new(2)));
        assert_eq!(view.next_lesson_id, None);
        assert!(!view.completed);
    }

    #[tokio::test]
    async fn lesson_from_another_course_is_not_found() {
        let (_storage, service, course_id) = seeded().await;
        let err = service
            .lesson_view(UserId::new(5), course_id, LessonId::new(99))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::LessonNotFound));
    }
}
