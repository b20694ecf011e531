use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scholar_core::model::{
    Course, CourseDraft, CourseId, Enrollment, EnrollmentId, Lesson, LessonId, LessonProgress,
    UserId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Catalog row: a course plus the counts shown next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseListing {
    pub course: Course,
    pub lesson_count: u32,
    pub enrollment_count: u32,
}

/// One of a learner's enrollments joined with its course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentListing {
    pub enrollment: Enrollment,
    pub course: Course,
    pub lesson_count: u32,
}

#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Insert a course and let the backend assign its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the course cannot be stored.
    async fn insert_course(
        &self,
        draft: &CourseDraft,
        created_at: DateTime<Utc>,
    ) -> Result<CourseId, StorageError>;

    /// Persist or update a course under its own id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the course cannot be stored.
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError>;

    /// Fetch a course by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError>;

    /// Published courses, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_published(&self, limit: u32) -> Result<Vec<CourseListing>, StorageError>;

    /// Number of learners enrolled in a course.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn enrollment_count(&self, id: CourseId) -> Result<u32, StorageError>;
}

#[async_trait]
pub trait LessonRepository: Send + Sync {
    /// Persist or update a lesson.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if another lesson of the course already
    /// holds the same position, or `StorageError::NotFound` for an unknown course.
    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError>;

    /// Fetch a lesson by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_lesson(&self, id: LessonId) -> Result<Option<Lesson>, StorageError>;

    /// Lessons of a course ordered by position.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_lessons(&self, course_id: CourseId) -> Result<Vec<Lesson>, StorageError>;
}

#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Create the (user, course) enrollment.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` when the pair already exists and
    /// `StorageError::NotFound` when the course does not.
    async fn insert_enrollment(
        &self,
        user_id: UserId,
        course_id: CourseId,
        enrolled_at: DateTime<Utc>,
    ) -> Result<Enrollment, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_enrollment(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<Enrollment>, StorageError>;

    /// A learner's enrollments, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_for_user(&self, user_id: UserId)
    -> Result<Vec<EnrollmentListing>, StorageError>;
}

#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Upsert a completed row for (user, lesson), keeping an existing
    /// `completed_at`. Returns the stored row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn mark_completed(
        &self,
        progress: &LessonProgress,
    ) -> Result<LessonProgress, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_progress(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
    ) -> Result<Option<LessonProgress>, StorageError>;

    /// Every completed row of a learner, across all courses.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_completed(&self, user_id: UserId) -> Result<Vec<LessonProgress>, StorageError>;

    /// Completed rows of a learner within one course.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_completed_in_course(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Vec<LessonProgress>, StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

#[derive(Default)]
struct MemoryState {
    courses: HashMap<CourseId, Course>,
    lessons: HashMap<LessonId, Lesson>,
    enrollments: Vec<Enrollment>,
    progress: HashMap<(UserId, LessonId), LessonProgress>,
}

impl MemoryState {
    fn lesson_count(&self, course_id: CourseId) -> u32 {
        let n = self
            .lessons
            .values()
            .filter(|l| l.course_id() == course_id)
            .count();
        u32::try_from(n).unwrap_or(u32::MAX)
    }

    fn enrollment_count(&self, course_id: CourseId) -> u32 {
        let n = self
            .enrollments
            .iter()
            .filter(|e| e.course_id == course_id)
            .count();
        u32::try_from(n).unwrap_or(u32::MAX)
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl CourseRepository for InMemoryRepository {
    async fn insert_course(
        &self,
        draft: &CourseDraft,
        created_at: DateTime<Utc>,
    ) -> Result<CourseId, StorageError> {
        let mut guard = self.lock()?;
        let next = guard.courses.keys().map(CourseId::value).max().unwrap_or(0) + 1;
        let course = Course::new(CourseId::new(next), draft.clone(), created_at)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        guard.courses.insert(course.id(), course);
        Ok(CourseId::new(next))
    }

    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError> {
        self.lock()?.courses.insert(course.id(), course.clone());
        Ok(())
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        Ok(self.lock()?.courses.get(&id).cloned())
    }

    async fn list_published(&self, limit: u32) -> Result<Vec<CourseListing>, StorageError> {
        let guard = self.lock()?;
        let mut listings: Vec<CourseListing> = guard
            .courses
            .values()
            .filter(|c| c.is_published())
            .map(|c| CourseListing {
                course: c.clone(),
                lesson_count: guard.lesson_count(c.id()),
                enrollment_count: guard.enrollment_count(c.id()),
            })
            .collect();
        listings.sort_by(|a, b| {
            b.course
                .created_at()
                .cmp(&a.course.created_at())
                .then(b.course.id().cmp(&a.course.id()))
        });
        listings.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(listings)
    }

    async fn enrollment_count(&self, id: CourseId) -> Result<u32, StorageError> {
        Ok(self.lock()?.enrollment_count(id))
    }
}

#[async_trait]
impl LessonRepository for InMemoryRepository {
    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if !guard.courses.contains_key(&lesson.course_id()) {
            return Err(StorageError::NotFound);
        }
        let clash = guard.lessons.values().any(|l| {
            l.id() != lesson.id()
                && l.course_id() == lesson.course_id()
                && l.position() == lesson.position()
        });
        if clash {
            return Err(StorageError::Conflict);
        }
        guard.lessons.insert(lesson.id(), lesson.clone());
        Ok(())
    }

    async fn get_lesson(&self, id: LessonId) -> Result<Option<Lesson>, StorageError> {
        Ok(self.lock()?.lessons.get(&id).cloned())
    }

    async fn list_lessons(&self, course_id: CourseId) -> Result<Vec<Lesson>, StorageError> {
        let guard = self.lock()?;
        let mut lessons: Vec<Lesson> = guard
            .lessons
            .values()
            .filter(|l| l.course_id() == course_id)
            .cloned()
            .collect();
        lessons.sort_by_key(Lesson::position);
        Ok(lessons)
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryRepository {
    async fn insert_enrollment(
        &self,
        user_id: UserId,
        course_id: CourseId,
        enrolled_at: DateTime<Utc>,
    ) -> Result<Enrollment, StorageError> {
        let mut guard = self.lock()?;
        if !guard.courses.contains_key(&course_id) {
            return Err(StorageError::NotFound);
        }
        if guard
            .enrollments
            .iter()
            .any(|e| e.user_id == user_id && e.course_id == course_id)
        {
            return Err(StorageError::Conflict);
        }
        let id = EnrollmentId::new(guard.enrollments.len() as u64 + 1);
        let enrollment = Enrollment {
            id,
            user_id,
            course_id,
            enrolled_at,
        };
        guard.enrollments.push(enrollment.clone());
        Ok(enrollment)
    }

    async fn get_enrollment(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<Enrollment>, StorageError> {
        Ok(self
            .lock()?
            .enrollments
            .iter()
            .find(|e| e.user_id == user_id && e.course_id == course_id)
            .cloned())
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<EnrollmentListing>, StorageError> {
        let guard = self.lock()?;
        let mut listings = Vec::new();
        for enrollment in guard.enrollments.iter().filter(|e| e.user_id == user_id) {
            let course = guard
                .courses
                .get(&enrollment.course_id)
                .cloned()
                .ok_or(StorageError::NotFound)?;
            listings.push(EnrollmentListing {
                enrollment: enrollment.clone(),
                lesson_count: guard.lesson_count(enrollment.course_id),
                course,
            });
        }
        listings.sort_by(|a, b| {
            b.enrollment
                .enrolled_at
                .cmp(&a.enrollment.enrolled_at)
                .then(b.enrollment.id.cmp(&a.enrollment.id))
        });
        Ok(listings)
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn mark_completed(
        &self,
        progress: &LessonProgress,
    ) -> Result<LessonProgress, StorageError> {
        let now = progress.completed_at.ok_or_else(|| {
            StorageError::Serialization("completed progress requires a timestamp".into())
        })?;
        let mut guard = self.lock()?;
        let stored = guard
            .progress
            .entry((progress.user_id, progress.lesson_id))
            .or_insert_with(|| progress.clone());
        stored.mark_completed(now);
        Ok(stored.clone())
    }

    async fn get_progress(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
    ) -> Result<Option<LessonProgress>, StorageError> {
        Ok(self.lock()?.progress.get(&(user_id, lesson_id)).cloned())
    }

    async fn list_completed(&self, user_id: UserId) -> Result<Vec<LessonProgress>, StorageError> {
        let guard = self.lock()?;
        let mut rows: Vec<LessonProgress> = guard
            .progress
            .values()
            .filter(|p| p.user_id == user_id && p.completed)
            .cloned()
            .collect();
        rows.sort_by_key(|p| p.lesson_id);
        Ok(rows)
    }

    async fn list_completed_in_course(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Vec<LessonProgress>, StorageError> {
        let mut rows = self.list_completed(user_id).await?;
        rows.retain(|p| p.course_id == course_id);
        Ok(rows)
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub courses: Arc<dyn CourseRepository>,
    pub lessons: Arc<dyn LessonRepository>,
    pub enrollments: Arc<dyn EnrollmentRepository>,
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            courses: Arc::new(repo.clone()),
            lessons: Arc::new(repo.clone()),
            enrollments: Arc::new(repo.clone()),
            progress: Arc::new(repo),
        }
    }
}
