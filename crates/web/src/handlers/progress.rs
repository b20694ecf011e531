use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use super::required;
use crate::AppState;
use crate::api_error::ApiError;
use crate::auth::AuthUser;
use crate::dto::{CompleteLessonRequest, ProgressDto, ProgressResponse};

pub async fn complete_lesson(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<CompleteLessonRequest>, JsonRejection>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let Json(request) = payload?;

    // A body naming someone else is treated as an impersonation attempt.
    if request.user_id.is_some_and(|claimed| claimed != user_id) {
        tracing::warn!(%user_id, "progress body names a different user");
        return Err(ApiError::Unauthenticated);
    }
    let course_id = required(request.course_id, "Course ID")?;
    let lesson_id = required(request.lesson_id, "Lesson ID")?;

    let progress = state
        .services
        .progress()
        .complete_lesson(user_id, course_id, lesson_id)
        .await?;
    Ok(Json(ProgressResponse {
        progress: ProgressDto::from(&progress),
    }))
}
