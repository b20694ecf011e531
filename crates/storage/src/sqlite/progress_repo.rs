use scholar_core::model::{CourseId, LessonId, LessonProgress, UserId};

use super::SqliteRepository;
use super::mapping::{db_err, map_progress_row, to_i64};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn mark_completed(
        &self,
        progress: &LessonProgress,
    ) -> Result<LessonProgress, StorageError> {
        let completed_at = progress.completed_at.ok_or_else(|| {
            StorageError::Serialization("completed progress requires a timestamp".into())
        })?;

        let row = sqlx::query(
            r"
            INSERT INTO progress (user_id, lesson_id, course_id, completed, completed_at)
            VALUES (?1, ?2, ?3, 1, ?4)
            ON CONFLICT(user_id, lesson_id) DO UPDATE SET
                completed = 1,
                completed_at = COALESCE(progress.completed_at, excluded.completed_at)
            RETURNING user_id, lesson_id, course_id, completed, completed_at
            ",
        )
        .bind(to_i64("user_id", progress.user_id.value())?)
        .bind(to_i64("lesson_id", progress.lesson_id.value())?)
        .bind(to_i64("course_id", progress.course_id.value())?)
        .bind(completed_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        map_progress_row(&row)
    }

    async fn get_progress(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
    ) -> Result<Option<LessonProgress>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT user_id, lesson_id, course_id, completed, completed_at
            FROM progress
            WHERE user_id = ?1 AND lesson_id = ?2
            ",
        )
        .bind(to_i64("user_id", user_id.value())?)
        .bind(to_i64("lesson_id", lesson_id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(map_progress_row).transpose()
    }

    async fn list_completed(&self, user_id: UserId) -> Result<Vec<LessonProgress>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT user_id, lesson_id, course_id, completed, completed_at
            FROM progress
            WHERE user_id = ?1 AND completed = 1
            ORDER BY lesson_id ASC
            ",
        )
        .bind(to_i64("user_id", user_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_progress_row).collect()
    }

    async fn list_completed_in_course(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Vec<LessonProgress>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT user_id, lesson_id, course_id, completed, completed_at
            FROM progress
            WHERE user_id = ?1 AND course_id = ?2 AND completed = 1
            ORDER BY lesson_id ASC
            ",
        )
        .bind(to_i64("user_id", user_id.value())?)
        .bind(to_i64("course_id", course_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_progress_row).collect()
    }
}
