use chrono::{DateTime, Utc};
use scholar_core::model::{CourseId, Enrollment, UserId};

use super::SqliteRepository;
use super::course_repo::COURSE_COLUMNS;
use super::mapping::{count, db_err, map_course_row, map_enrollment_row, to_i64};
use crate::repository::{EnrollmentListing, EnrollmentRepository, StorageError};

#[async_trait::async_trait]
impl EnrollmentRepository for SqliteRepository {
    async fn insert_enrollment(
        &self,
        user_id: UserId,
        course_id: CourseId,
        enrolled_at: DateTime<Utc>,
    ) -> Result<Enrollment, StorageError> {
        // The UNIQUE (user_id, course_id) constraint turns a second attempt into
        // a Conflict; an unknown course trips the foreign key (NotFound).
        let row = sqlx::query(
            r"
            INSERT INTO enrollments (user_id, course_id, enrolled_at)
            VALUES (?1, ?2, ?3)
            RETURNING id AS enrollment_id, user_id, course_id, enrolled_at
            ",
        )
        .bind(to_i64("user_id", user_id.value())?)
        .bind(to_i64("course_id", course_id.value())?)
        .bind(enrolled_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        map_enrollment_row(&row)
    }

    async fn get_enrollment(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<Enrollment>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id AS enrollment_id, user_id, course_id, enrolled_at
            FROM enrollments
            WHERE user_id = ?1 AND course_id = ?2
            ",
        )
        .bind(to_i64("user_id", user_id.value())?)
        .bind(to_i64("course_id", course_id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(map_enrollment_row).transpose()
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<EnrollmentListing>, StorageError> {
        let sql = format!(
            r"
            SELECT e.id AS enrollment_id, e.user_id AS user_id, e.course_id AS course_id,
                e.enrolled_at AS enrolled_at,
                {COURSE_COLUMNS},
                (SELECT COUNT(*) FROM lessons l WHERE l.course_id = c.id) AS lesson_count
            FROM enrollments e
            JOIN courses c ON c.id = e.course_id
            WHERE e.user_id = ?1
            ORDER BY e.enrolled_at DESC, e.id DESC
            "
        );
        let rows = sqlx::query(&sql)
            .bind(to_i64("user_id", user_id.value())?)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let mut listings = Vec::with_capacity(rows.len());
        for row in rows {
            listings.push(EnrollmentListing {
                enrollment: map_enrollment_row(&row)?,
                course: map_course_row(&row)?,
                lesson_count: count(&row, "lesson_count")?,
            });
        }
        Ok(listings)
    }
}
