//! Sample catalog content installed by the `seed` binary.

use chrono::{DateTime, Utc};
use scholar_core::model::{
    Course, CourseDraft, CourseId, CourseLevel, Lesson, LessonDraft, LessonId, UserId,
};

use crate::repository::{Storage, StorageError};

pub const SAMPLE_COURSE_ID: CourseId = CourseId::new(1);

struct SampleLesson {
    title: &'static str,
    description: &'static str,
    content: &'static str,
    duration_minutes: u32,
    is_free: bool,
}

const LESSONS: [SampleLesson; 3] = [
    SampleLesson {
        title: "Getting Started with HTML",
        description: "Learn the basics of HTML structure and tags",
        content: concat!(
            "<h2>What is HTML?</h2>\n",
            "<p>HTML (HyperText Markup Language) is the standard markup language for creating \
             web pages.</p>\n",
            "<h3>Basic Structure</h3>\n",
            "<pre><code>&lt;!DOCTYPE html&gt;\n",
            "&lt;html&gt;\n",
            "  &lt;head&gt;\n",
            "    &lt;title&gt;My Page&lt;/title&gt;\n",
            "  &lt;/head&gt;\n",
            "  &lt;body&gt;\n",
            "    &lt;h1&gt;Hello World&lt;/h1&gt;\n",
            "  &lt;/body&gt;\n",
            "&lt;/html&gt;</code></pre>",
        ),
        duration_minutes: 30,
        is_free: true,
    },
    SampleLesson {
        title: "CSS Fundamentals",
        description: "Master CSS styling and layout",
        content: "<h2>Introduction to CSS</h2>\n\
<p>CSS (Cascading Style Sheets) is used to style HTML elements.</p>\n\
<h3>Basic Syntax</h3>\n\
<pre><code>selector {\n  property: value;\n}</code></pre>\n\
<p>CSS allows you to control colors, fonts, spacing, and layout of your web pages.</p>",
        duration_minutes: 45,
        is_free: true,
    },
    SampleLesson {
        title: "JavaScript Basics",
        description: "Introduction to JavaScript programming",
        content: "<h2>JavaScript Fundamentals</h2>\n\
<p>JavaScript is a programming language that adds interactivity to web pages.</p>\n\
<h3>Variables</h3>\n\
<pre><code>let name = \"ScholarBot\";\nconst age = 2024;\nvar isActive = true;</code></pre>\n\
<p>JavaScript variables can hold different types of data including strings, numbers, and booleans.</p>",
        duration_minutes: 60,
        is_free: false,
    },
];

const SAMPLE_TITLE: &str = "Introduction to Web Development";

/// Upsert the "Introduction to Web Development" course and its three lessons.
///
/// Lesson ids are `1..=3` and positions follow the same order, so running the
/// seed twice leaves the catalog unchanged apart from refreshed fields.
///
/// # Errors
///
/// Returns `StorageError::Conflict` without writing anything if course `1`
/// holds a different course or a lesson id in `1..=3` belongs to another
/// course. Returns other `StorageError`s if a row cannot be read or written.
pub async fn install_sample_course(
    storage: &Storage,
    instructor_id: UserId,
    now: DateTime<Utc>,
) -> Result<CourseId, StorageError> {
    let draft = CourseDraft {
        title: SAMPLE_TITLE.into(),
        description: "Learn the fundamentals of web development including HTML, CSS, and \
                      JavaScript. This comprehensive course will take you from beginner to \
                      building your first web applications."
            .into(),
        instructor_id,
        category: Some("Web Development".into()),
        level: CourseLevel::Beginner,
        duration_hours: 40,
        published: true,
    };
    let created_at = match storage.courses.get_course(SAMPLE_COURSE_ID).await? {
        Some(existing) if existing.title() != SAMPLE_TITLE => return Err(StorageError::Conflict),
        Some(existing) => existing.created_at(),
        None => now,
    };
    for id in sample_lesson_ids() {
        if let Some(existing) = storage.lessons.get_lesson(id).await? {
            if existing.course_id() != SAMPLE_COURSE_ID {
                return Err(StorageError::Conflict);
            }
        }
    }
    let course = Course::new(SAMPLE_COURSE_ID, draft, created_at)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    storage.courses.upsert_course(&course).await?;

    for ((id, position), sample) in sample_lesson_ids().zip(1u32..).zip(LESSONS.iter()) {
        let lesson = Lesson::new(
            id,
            LessonDraft {
                course_id: SAMPLE_COURSE_ID,
                title: sample.title.into(),
                description: sample.description.into(),
                content: sample.content.into(),
                position,
                duration_minutes: sample.duration_minutes,
                is_free: sample.is_free,
            },
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
        storage.lessons.upsert_lesson(&lesson).await?;
    }

    Ok(SAMPLE_COURSE_ID)
}

fn sample_lesson_ids() -> impl Iterator<Item = LessonId> {
    (1..=LESSONS.len() as u64).map(LessonId::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholar_core::time::fixed_now;

    #[tokio::test]
    async fn installs_course_with_ordered_lessons() {
        let storage = Storage::in_memory();
        let id = install_sample_course(&storage, UserId::new(2), fixed_now())
            .await
            .unwrap();

        let course = storage.courses.get_course(id).await.unwrap().unwrap();
        assert_eq!(course.title(), "Introduction to Web Development");
        assert_eq!(course.category(), Some("Web Development"));
        assert!(course.is_published());

        let lessons = storage.lessons.list_lessons(id).await.unwrap();
        let titles: Vec<&str> = lessons.iter().map(Lesson::title).collect();
        assert_eq!(
            titles,
            ["Getting Started with HTML", "CSS Fundamentals", "JavaScript Basics"]
        );
        assert!(lessons[0].is_free());
        assert!(!lessons[2].is_free());
        assert!(lessons[0].content().contains(
            "&lt;html&gt;\n  &lt;head&gt;\n    &lt;title&gt;My Page&lt;/title&gt;\n  &lt;/head&gt;"
        ));
    }

    #[tokio::test]
    async fn reinstalling_is_idempotent() {
        let storage = Storage::in_memory();
        install_sample_course(&storage, UserId::new(2), fixed_now())
            .await
            .unwrap();
        install_sample_course(&storage, UserId::new(2), fixed_now())
            .await
            .unwrap();

        let listings = storage.courses.list_published(10).await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].lesson_count, 3);
    }

    fn foreign_course(id: u64) -> Course {
        Course::new(
            CourseId::new(id),
            CourseDraft {
                title: "Rust for Beginners".into(),
                description: "Ownership and borrowing".into(),
                instructor_id: UserId::new(9),
                category: None,
                level: CourseLevel::Beginner,
                duration_hours: 10,
                published: true,
            },
            fixed_now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn refuses_to_overwrite_another_course() {
        let storage = Storage::in_memory();
        storage.courses.upsert_course(&foreign_course(1)).await.unwrap();

        let err = install_sample_course(&storage, UserId::new(2), fixed_now())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict));

        let course = storage.courses.get_course(CourseId::new(1)).await.unwrap().unwrap();
        assert_eq!(course.title(), "Rust for Beginners");
        assert!(storage.lessons.list_lessons(CourseId::new(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn refuses_to_move_a_lesson_from_another_course() {
        let storage = Storage::in_memory();
        storage.courses.upsert_course(&foreign_course(7)).await.unwrap();
        let lesson = Lesson::new(
            LessonId::new(2),
            LessonDraft {
                course_id: CourseId::new(7),
                title: "Borrowing".into(),
                description: String::new(),
                content: "<p>References</p>".into(),
                position: 1,
                duration_minutes: 20,
                is_free: false,
            },
        )
        .unwrap();
        storage.lessons.upsert_lesson(&lesson).await.unwrap();

        let err = install_sample_course(&storage, UserId::new(2), fixed_now())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict));

        let kept = storage.lessons.get_lesson(LessonId::new(2)).await.unwrap().unwrap();
        assert_eq!(kept.course_id(), CourseId::new(7));
        assert!(storage.courses.get_course(SAMPLE_COURSE_ID).await.unwrap().is_none());
    }
}
