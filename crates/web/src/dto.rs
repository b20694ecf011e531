//! JSON shapes of the HTTP API (camelCase on the wire).

use chrono::{DateTime, Utc};
use scholar_core::aggregate::Completion;
use scholar_core::model::{
    ChatRole, ChatTurn, Course, CourseId, Enrollment, EnrollmentId, Lesson, LessonId,
    LessonProgress, UserId,
};
use serde::{Deserialize, Serialize};
use services::{CourseCard, CourseDetail, Dashboard, LessonView};
use storage::repository::CourseListing;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDto {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub instructor_id: UserId,
    pub category: Option<String>,
    pub level: &'static str,
    pub duration_hours: u32,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Course> for CourseDto {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id(),
            title: course.title().to_string(),
            description: course.description().to_string(),
            instructor_id: course.instructor_id(),
            category: course.category().map(str::to_string),
            level: course.level().as_str(),
            duration_hours: course.duration_hours(),
            is_published: course.is_published(),
            created_at: course.created_at(),
        }
    }
}

/// Lesson metadata without its content, for course outlines.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonSummaryDto {
    pub id: LessonId,
    pub course_id: CourseId,
    pub title: String,
    pub description: String,
    pub position: u32,
    pub duration_minutes: u32,
    pub is_free: bool,
}

impl From<&Lesson> for LessonSummaryDto {
    fn from(lesson: &Lesson) -> Self {
        Self {
            id: lesson.id(),
            course_id: lesson.course_id(),
            title: lesson.title().to_string(),
            description: lesson.description().to_string(),
            position: lesson.position(),
            duration_minutes: lesson.duration_minutes(),
            is_free: lesson.is_free(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDto {
    #[serde(flatten)]
    pub summary: LessonSummaryDto,
    pub content: String,
}

impl From<&Lesson> for LessonDto {
    fn from(lesson: &Lesson) -> Self {
        Self {
            summary: LessonSummaryDto::from(lesson),
            content: lesson.content().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntryDto {
    pub course: CourseDto,
    pub lesson_count: u32,
    pub enrollment_count: u32,
}

impl From<&CourseListing> for CatalogEntryDto {
    fn from(listing: &CourseListing) -> Self {
        Self {
            course: CourseDto::from(&listing.course),
            lesson_count: listing.lesson_count,
            enrollment_count: listing.enrollment_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetailDto {
    pub course: CourseDto,
    pub lessons: Vec<LessonSummaryDto>,
    pub lesson_count: usize,
    pub enrollment_count: u32,
    pub is_enrolled: bool,
    pub completed_lesson_ids: Vec<LessonId>,
    pub progress: Option<Completion>,
}

impl From<&CourseDetail> for CourseDetailDto {
    fn from(detail: &CourseDetail) -> Self {
        Self {
            course: CourseDto::from(&detail.course),
            lessons: detail
                .outline
                .lessons()
                .iter()
                .map(LessonSummaryDto::from)
                .collect(),
            lesson_count: detail.outline.len(),
            enrollment_count: detail.enrollment_count,
            is_enrolled: detail.is_enrolled(),
            completed_lesson_ids: detail.completed_lesson_ids.clone(),
            progress: detail.completion,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonViewDto {
    pub course: CourseDto,
    pub lesson: LessonDto,
    pub position: usize,
    pub lesson_count: usize,
    pub previous_lesson_id: Option<LessonId>,
    pub next_lesson_id: Option<LessonId>,
    pub is_enrolled: bool,
    pub completed: bool,
}

impl From<&LessonView> for LessonViewDto {
    fn from(view: &LessonView) -> Self {
        Self {
            course: CourseDto::from(&view.course),
            lesson: LessonDto::from(&view.lesson),
            position: view.ordinal,
            lesson_count: view.lesson_count,
            previous_lesson_id: view.previous_lesson_id,
            next_lesson_id: view.next_lesson_id,
            is_enrolled: view.enrolled,
            completed: view.completed,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentDto {
    pub id: EnrollmentId,
    pub user_id: UserId,
    pub course_id: CourseId,
    pub enrolled_at: DateTime<Utc>,
}

impl From<&Enrollment> for EnrollmentDto {
    fn from(e: &Enrollment) -> Self {
        Self {
            id: e.id,
            user_id: e.user_id,
            course_id: e.course_id,
            enrolled_at: e.enrolled_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EnrollResponse {
    pub enrollment: EnrollmentDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressDto {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub lesson_id: LessonId,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&LessonProgress> for ProgressDto {
    fn from(p: &LessonProgress) -> Self {
        Self {
            user_id: p.user_id,
            course_id: p.course_id,
            lesson_id: p.lesson_id,
            completed: p.completed,
            completed_at: p.completed_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub progress: ProgressDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseCardDto {
    pub enrollment: EnrollmentDto,
    pub course: CourseDto,
    #[serde(flatten)]
    pub completion: Completion,
}

impl From<&CourseCard> for CourseCardDto {
    fn from(card: &CourseCard) -> Self {
        Self {
            enrollment: EnrollmentDto::from(&card.enrollment),
            course: CourseDto::from(&card.course),
            completion: card.completion,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDto {
    pub enrolled_courses: usize,
    pub completed_courses: u32,
    pub overall: Completion,
    pub courses: Vec<CourseCardDto>,
}

impl From<&Dashboard> for DashboardDto {
    fn from(dashboard: &Dashboard) -> Self {
        Self {
            enrolled_courses: dashboard.enrolled_count(),
            completed_courses: dashboard.completed_courses,
            overall: dashboard.overall,
            courses: dashboard.courses.iter().map(CourseCardDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MyCoursesResponse {
    pub enrollments: Vec<CourseCardDto>,
}

//
// ─── REQUESTS ──────────────────────────────────────────────────────────────────
//

// Request fields are optional so that a missing field is reported as a
// validation error with the field's name.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub course_id: Option<CourseId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteLessonRequest {
    pub user_id: Option<UserId>,
    pub course_id: Option<CourseId>,
    pub lesson_id: Option<LessonId>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryTurnDto {
    pub role: String,
    pub content: String,
}

impl From<HistoryTurnDto> for ChatTurn {
    fn from(turn: HistoryTurnDto) -> Self {
        ChatTurn::new(ChatRole::from_client(&turn.role), turn.content)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonChatRequest {
    pub course_id: Option<CourseId>,
    pub lesson_id: Option<LessonId>,
    pub message: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryTurnDto>,
}

#[derive(Debug, Deserialize)]
pub struct GeneralChatRequest {
    pub message: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryTurnDto>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}
