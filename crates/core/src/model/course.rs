use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{CourseId, UserId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course title cannot be empty")]
    EmptyTitle,

    #[error("unknown course level: {0}")]
    UnknownLevel(String),
}

//
// ─── LEVEL ─────────────────────────────────────────────────────────────────────
//

/// Difficulty band advertised in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CourseLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CourseLevel::Beginner => "beginner",
            CourseLevel::Intermediate => "intermediate",
            CourseLevel::Advanced => "advanced",
        }
    }

    /// Parses the lowercase storage form.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::UnknownLevel` for anything else.
    pub fn parse(raw: &str) -> Result<Self, CourseError> {
        match raw {
            "beginner" => Ok(CourseLevel::Beginner),
            "intermediate" => Ok(CourseLevel::Intermediate),
            "advanced" => Ok(CourseLevel::Advanced),
            other => Err(CourseError::UnknownLevel(other.to_owned())),
        }
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Instructor-supplied fields for a course before it receives an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    pub instructor_id: UserId,
    pub category: Option<String>,
    pub level: CourseLevel,
    pub duration_hours: u32,
    pub published: bool,
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// A published (or draft) course in the catalog.
///
/// Learners only ever read courses; the lesson count is derived from the
/// lessons table and therefore lives on the listing types, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    id: CourseId,
    title: String,
    description: String,
    instructor_id: UserId,
    category: Option<String>,
    level: CourseLevel,
    duration_hours: u32,
    published: bool,
    created_at: DateTime<Utc>,
}

impl Course {
    /// Creates a course from a draft.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptyTitle` if the title is empty or whitespace-only.
    pub fn new(
        id: CourseId,
        draft: CourseDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Self, CourseError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(CourseError::EmptyTitle);
        }

        let category = draft
            .category
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty());

        Ok(Self {
            id,
            title: title.to_owned(),
            description: draft.description.trim().to_owned(),
            instructor_id: draft.instructor_id,
            category,
            level: draft.level,
            duration_hours: draft.duration_hours,
            published: draft.published,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> CourseId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn instructor_id(&self) -> UserId {
        self.instructor_id
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub fn level(&self) -> CourseLevel {
        self.level
    }

    /// Advertised total duration in hours.
    #[must_use]
    pub fn duration_hours(&self) -> u32 {
        self.duration_hours
    }

    #[must_use]
    pub fn is_published(&self) -> bool {
        self.published
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn draft(title: &str) -> CourseDraft {
        CourseDraft {
            title: title.to_owned(),
            description: "  Learn the basics.  ".to_owned(),
            instructor_id: UserId::new(2),
            category: Some("   ".to_owned()),
            level: CourseLevel::Beginner,
            duration_hours: 40,
            published: true,
        }
    }

    #[test]
    fn course_new_rejects_empty_title() {
        let err = Course::new(CourseId::new(1), draft("  "), fixed_now()).unwrap_err();
        assert_eq!(err, CourseError::EmptyTitle);
    }

    #[test]
    fn course_new_trims_and_drops_blank_category() {
        let course = Course::new(CourseId::new(1), draft("  Web Dev "), fixed_now()).unwrap();
        assert_eq!(course.title(), "Web Dev");
        assert_eq!(course.description(), "Learn the basics.");
        assert_eq!(course.category(), None);
        assert!(course.is_published());
    }

    #[test]
    fn level_round_trips_through_storage_form() {
        for level in [
            CourseLevel::Beginner,
            CourseLevel::Intermediate,
            CourseLevel::Advanced,
        ] {
            assert_eq!(CourseLevel::parse(level.as_str()).unwrap(), level);
        }
        assert!(matches!(
            CourseLevel::parse("expert"),
            Err(CourseError::UnknownLevel(_))
        ));
    }
}
