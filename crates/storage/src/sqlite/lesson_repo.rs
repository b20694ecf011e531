use scholar_core::model::{CourseId, Lesson, LessonId};

use super::SqliteRepository;
use super::mapping::{db_err, map_lesson_row, to_i64};
use crate::repository::{LessonRepository, StorageError};

#[async_trait::async_trait]
impl LessonRepository for SqliteRepository {
    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO lessons (id, course_id, title, description, content, position, duration_minutes, is_free)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                course_id = excluded.course_id,
                title = excluded.title,
                description = excluded.description,
                content = excluded.content,
                position = excluded.position,
                duration_minutes = excluded.duration_minutes,
                is_free = excluded.is_free
            ",
        )
        .bind(to_i64("lesson id", lesson.id().value())?)
        .bind(to_i64("course_id", lesson.course_id().value())?)
        .bind(lesson.title())
        .bind(lesson.description())
        .bind(lesson.content())
        .bind(i64::from(lesson.position()))
        .bind(i64::from(lesson.duration_minutes()))
        .bind(i64::from(lesson.is_free()))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn get_lesson(&self, id: LessonId) -> Result<Option<Lesson>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, course_id, title, description, content, position, duration_minutes, is_free
            FROM lessons WHERE id = ?1
            ",
        )
        .bind(to_i64("lesson id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(map_lesson_row).transpose()
    }

    async fn list_lessons(&self, course_id: CourseId) -> Result<Vec<Lesson>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, course_id, title, description, content, position, duration_minutes, is_free
            FROM lessons
            WHERE course_id = ?1
            ORDER BY position ASC
            ",
        )
        .bind(to_i64("course_id", course_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_lesson_row).collect()
    }
}
