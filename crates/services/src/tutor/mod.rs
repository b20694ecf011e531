//! Stateless AI tutor: templated instruction, truncated history, one
//! completion call per message.

mod client;
mod prompt;

use std::sync::Arc;

use scholar_core::model::{ChatTurn, CourseId, LessonId};
use storage::repository::{CourseRepository, LessonRepository};
use tracing::{debug, warn};

use crate::error::TutorError;

pub use client::{CompletionClient, CompletionConfig, OpenAiCompletionClient};
pub use prompt::{LESSON_EXCERPT_CHARS, LessonContext, build_messages, excerpt, system_prompt};

/// Reply used when the completion service answers without text.
pub const FALLBACK_REPLY: &str = "Sorry, I could not generate a response.";

#[derive(Clone)]
pub struct TutorService {
    client: Arc<dyn CompletionClient>,
    courses: Arc<dyn CourseRepository>,
    lessons: Arc<dyn LessonRepository>,
}

impl TutorService {
    #[must_use]
    pub fn new(
        client: Arc<dyn CompletionClient>,
        courses: Arc<dyn CourseRepository>,
        lessons: Arc<dyn LessonRepository>,
    ) -> Self {
        Self {
            client,
            courses,
            lessons,
        }
    }

    /// Forward `message` with the recent `history` under a generic or
    /// lesson-scoped instruction.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::EmptyMessage` for a blank message and
    /// `TutorError::Completion` when the completion service fails.
    pub async fn converse(
        &self,
        history: &[ChatTurn],
        message: &str,
        context: Option<&LessonContext<'_>>,
    ) -> Result<String, TutorError> {
        if message.trim().is_empty() {
            return Err(TutorError::EmptyMessage);
        }

        let messages = build_messages(system_prompt(context), history, message);
        debug!(
            forwarded = messages.len(),
            received_history = history.len(),
            lesson_scoped = context.is_some(),
            "forwarding chat to completion service"
        );

        match self.client.complete(&messages).await {
            Ok(Some(reply)) => Ok(reply),
            Ok(None) => Ok(FALLBACK_REPLY.to_string()),
            Err(err) => {
                warn!(error = %err, "completion request failed");
                Err(err.into())
            }
        }
    }

    /// Chat without lesson context.
    ///
    /// # Errors
    ///
    /// See [`TutorService::converse`].
    pub async fn chat_general(
        &self,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String, TutorError> {
        self.converse(history, message, None).await
    }

    /// Chat about one lesson of a course.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::EmptyMessage` for a blank message,
    /// `TutorError::NotFound` if the course or lesson is unknown or the lesson
    /// belongs to a different course, plus the errors of
    /// [`TutorService::converse`].
    pub async fn chat_in_lesson(
        &self,
        course_id: CourseId,
        lesson_id: LessonId,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String, TutorError> {
        if message.trim().is_empty() {
            return Err(TutorError::EmptyMessage);
        }

        let course = self
            .courses
            .get_course(course_id)
            .await?
            .ok_or(TutorError::NotFound)?;
        let lesson = self
            .lessons
            .get_lesson(lesson_id)
            .await?
            .filter(|lesson| lesson.course_id() == course_id)
            .ok_or(TutorError::NotFound)?;

        let context = LessonContext {
            course: &course,
            lesson: &lesson,
        };
        self.converse(history, message, Some(&context)).await
    }
}
