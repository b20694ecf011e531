use chrono::{DateTime, Utc};
use scholar_core::model::{Course, CourseDraft, CourseId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{count, db_err, map_course_row, ser, to_i64};
use crate::repository::{CourseListing, CourseRepository, StorageError};

pub(crate) const COURSE_COLUMNS: &str = "c.id AS id, c.title AS title, \
     c.description AS description, c.instructor_id AS instructor_id, c.category AS category, \
     c.level AS level, c.duration_hours AS duration_hours, c.published AS published, \
     c.created_at AS created_at";

#[async_trait::async_trait]
impl CourseRepository for SqliteRepository {
    async fn insert_course(
        &self,
        draft: &CourseDraft,
        created_at: DateTime<Utc>,
    ) -> Result<CourseId, StorageError> {
        // Validate through the domain constructor before touching the table.
        let course = Course::new(CourseId::new(0), draft.clone(), created_at).map_err(ser)?;

        let res = sqlx::query(
            r"
            INSERT INTO courses (title, description, instructor_id, category, level, duration_hours, published, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(course.title())
        .bind(course.description())
        .bind(to_i64("instructor_id", course.instructor_id().value())?)
        .bind(course.category())
        .bind(course.level().as_str())
        .bind(i64::from(course.duration_hours()))
        .bind(i64::from(course.is_published()))
        .bind(course.created_at())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        let id = u64::try_from(res.last_insert_rowid())
            .map_err(|_| StorageError::Serialization("course id sign overflow".into()))?;
        Ok(CourseId::new(id))
    }

    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO courses (id, title, description, instructor_id, category, level, duration_hours, published, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                instructor_id = excluded.instructor_id,
                category = excluded.category,
                level = excluded.level,
                duration_hours = excluded.duration_hours,
                published = excluded.published
            ",
        )
        .bind(to_i64("course id", course.id().value())?)
        .bind(course.title())
        .bind(course.description())
        .bind(to_i64("instructor_id", course.instructor_id().value())?)
        .bind(course.category())
        .bind(course.level().as_str())
        .bind(i64::from(course.duration_hours()))
        .bind(i64::from(course.is_published()))
        .bind(course.created_at())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses c WHERE c.id = ?1");
        let row = sqlx::query(&sql)
            .bind(to_i64("course id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(map_course_row).transpose()
    }

    async fn list_published(&self, limit: u32) -> Result<Vec<CourseListing>, StorageError> {
        let sql = format!(
            r"
            SELECT {COURSE_COLUMNS},
                (SELECT COUNT(*) FROM lessons l WHERE l.course_id = c.id) AS lesson_count,
                (SELECT COUNT(*) FROM enrollments e WHERE e.course_id = c.id) AS enrollment_count
            FROM courses c
            WHERE c.published = 1
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT ?1
            "
        );
        let rows = sqlx::query(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let mut listings = Vec::with_capacity(rows.len());
        for row in rows {
            listings.push(CourseListing {
                course: map_course_row(&row)?,
                lesson_count: count(&row, "lesson_count")?,
                enrollment_count: count(&row, "enrollment_count")?,
            });
        }
        Ok(listings)
    }

    async fn enrollment_count(&self, id: CourseId) -> Result<u32, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM enrollments WHERE course_id = ?1")
            .bind(to_i64("course id", id.value())?)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        let total: i64 = row.try_get("total").map_err(ser)?;
        Ok(u32::try_from(total).unwrap_or(u32::MAX))
    }
}
