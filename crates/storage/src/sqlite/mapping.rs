use chrono::{DateTime, Utc};
use scholar_core::model::{
    Course, CourseDraft, CourseId, CourseLevel, Enrollment, EnrollmentId, Lesson, LessonDraft,
    LessonId, LessonProgress, UserId,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Maps driver errors, turning constraint violations into domain outcomes.
pub(crate) fn db_err(e: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(ref db) = e {
        if db.is_unique_violation() {
            return StorageError::Conflict;
        }
        if db.is_foreign_key_violation() {
            return StorageError::NotFound;
        }
    }
    StorageError::Connection(e.to_string())
}

pub(crate) fn to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn to_u32(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn flag(row: &SqliteRow, column: &'static str) -> Result<bool, StorageError> {
    Ok(row.try_get::<i64, _>(column).map_err(ser)? != 0)
}

pub(crate) fn count(row: &SqliteRow, column: &'static str) -> Result<u32, StorageError> {
    to_u32(column, row.try_get::<i64, _>(column).map_err(ser)?)
}

pub(crate) fn map_course_row(row: &SqliteRow) -> Result<Course, StorageError> {
    let level: String = row.try_get("level").map_err(ser)?;
    let draft = CourseDraft {
        title: row.try_get("title").map_err(ser)?,
        description: row.try_get("description").map_err(ser)?,
        instructor_id: UserId::new(to_u64(
            "instructor_id",
            row.try_get("instructor_id").map_err(ser)?,
        )?),
        category: row.try_get("category").map_err(ser)?,
        level: CourseLevel::parse(&level).map_err(ser)?,
        duration_hours: to_u32(
            "duration_hours",
            row.try_get("duration_hours").map_err(ser)?,
        )?,
        published: flag(row, "published")?,
    };
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(ser)?;

    Course::new(
        CourseId::new(to_u64("course id", row.try_get("id").map_err(ser)?)?),
        draft,
        created_at,
    )
    .map_err(ser)
}

pub(crate) fn map_lesson_row(row: &SqliteRow) -> Result<Lesson, StorageError> {
    let draft = LessonDraft {
        course_id: CourseId::new(to_u64("course_id", row.try_get("course_id").map_err(ser)?)?),
        title: row.try_get("title").map_err(ser)?,
        description: row.try_get("description").map_err(ser)?,
        content: row.try_get("content").map_err(ser)?,
        position: to_u32("position", row.try_get("position").map_err(ser)?)?,
        duration_minutes: to_u32(
            "duration_minutes",
            row.try_get("duration_minutes").map_err(ser)?,
        )?,
        is_free: flag(row, "is_free")?,
    };

    Lesson::new(
        LessonId::new(to_u64("lesson id", row.try_get("id").map_err(ser)?)?),
        draft,
    )
    .map_err(ser)
}

/// Expects the enrollment columns aliased as `enrollment_id`, `user_id`,
/// `course_id`, `enrolled_at`.
pub(crate) fn map_enrollment_row(row: &SqliteRow) -> Result<Enrollment, StorageError> {
    Ok(Enrollment {
        id: EnrollmentId::new(to_u64(
            "enrollment_id",
            row.try_get("enrollment_id").map_err(ser)?,
        )?),
        user_id: UserId::new(to_u64("user_id", row.try_get("user_id").map_err(ser)?)?),
        course_id: CourseId::new(to_u64("course_id", row.try_get("course_id").map_err(ser)?)?),
        enrolled_at: row.try_get("enrolled_at").map_err(ser)?,
    })
}

pub(crate) fn map_progress_row(row: &SqliteRow) -> Result<LessonProgress, StorageError> {
    Ok(LessonProgress {
        user_id: UserId::new(to_u64("user_id", row.try_get("user_id").map_err(ser)?)?),
        course_id: CourseId::new(to_u64("course_id", row.try_get("course_id").map_err(ser)?)?),
        lesson_id: LessonId::new(to_u64("lesson_id", row.try_get("lesson_id").map_err(ser)?)?),
        completed: flag(row, "completed")?,
        completed_at: row.try_get("completed_at").map_err(ser)?,
    })
}
