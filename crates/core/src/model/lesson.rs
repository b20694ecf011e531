use std::collections::HashSet;

use thiserror::Error;

use crate::model::ids::{CourseId, LessonId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson title cannot be empty")]
    EmptyTitle,

    #[error("lesson position must be >= 1")]
    InvalidPosition,

    #[error("position {position} is used by more than one lesson")]
    DuplicatePosition { position: u32 },

    #[error("lesson {lesson} does not belong to course {course}")]
    ForeignLesson { lesson: LessonId, course: CourseId },
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonDraft {
    pub course_id: CourseId,
    pub title: String,
    pub description: String,
    pub content: String,
    pub position: u32,
    pub duration_minutes: u32,
    pub is_free: bool,
}

/// A single unit of course content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    course_id: CourseId,
    title: String,
    description: String,
    content: String,
    position: u32,
    duration_minutes: u32,
    is_free: bool,
}

impl Lesson {
    /// Creates a lesson from a draft.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::EmptyTitle` for a blank title and
    /// `LessonError::InvalidPosition` when `position` is zero.
    pub fn new(id: LessonId, draft: LessonDraft) -> Result<Self, LessonError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(LessonError::EmptyTitle);
        }
        if draft.position == 0 {
            return Err(LessonError::InvalidPosition);
        }

        Ok(Self {
            id,
            course_id: draft.course_id,
            title: title.to_owned(),
            description: draft.description.trim().to_owned(),
            content: draft.content,
            position: draft.position,
            duration_minutes: draft.duration_minutes,
            is_free: draft.is_free,
        })
    }

    #[must_use]
    pub fn id(&self) -> LessonId {
        self.id
    }

    #[must_use]
    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Raw content payload (HTML as authored).
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Ordering index within the parent course, starting at 1.
    #[must_use]
    pub fn position(&self) -> u32 {
        self.position
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    /// Free-preview lessons can be read without enrolling.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.is_free
    }
}

//
// ─── OUTLINE ───────────────────────────────────────────────────────────────────
//

/// The ordered lesson list of one course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseOutline {
    course_id: CourseId,
    lessons: Vec<Lesson>,
}

impl CourseOutline {
    /// Orders `lessons` by position.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::ForeignLesson` if a lesson belongs to another course
    /// and `LessonError::DuplicatePosition` if two lessons share a position.
    pub fn new(course_id: CourseId, mut lessons: Vec<Lesson>) -> Result<Self, LessonError> {
        let mut seen = HashSet::with_capacity(lessons.len());
        for lesson in &lessons {
            if lesson.course_id != course_id {
                return Err(LessonError::ForeignLesson {
                    lesson: lesson.id,
                    course: course_id,
                });
            }
            if !seen.insert(lesson.position) {
                return Err(LessonError::DuplicatePosition {
                    position: lesson.position,
                });
            }
        }
        lessons.sort_by_key(|l| l.position);
        Ok(Self { course_id, lessons })
    }

    #[must_use]
    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == id)
    }

    /// 1-based place of the lesson in the outline ("lesson n of m").
    #[must_use]
    pub fn ordinal_of(&self, id: LessonId) -> Option<usize> {
        self.index_of(id).map(|idx| idx + 1)
    }

    /// Lessons immediately before and after `id`.
    #[must_use]
    pub fn neighbors(&self, id: LessonId) -> (Option<&Lesson>, Option<&Lesson>) {
        let Some(idx) = self.index_of(id) else {
            return (None, None);
        };
        let previous = idx.checked_sub(1).and_then(|p| self.lessons.get(p));
        (previous, self.lessons.get(idx + 1))
    }

    fn index_of(&self, id: LessonId) -> Option<usize> {
        self.lessons.iter().position(|l| l.id == id)
    }
}
