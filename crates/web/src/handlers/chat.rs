use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use scholar_core::model::ChatTurn;

use super::required;
use crate::AppState;
use crate::api_error::ApiError;
use crate::auth::AuthUser;
use crate::dto::{ChatResponse, GeneralChatRequest, HistoryTurnDto, LessonChatRequest};

fn turns(history: Vec<HistoryTurnDto>) -> Vec<ChatTurn> {
    history.into_iter().map(ChatTurn::from).collect()
}

pub async fn lesson_chat(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<LessonChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;
    let message = required(request.message, "Message")?;
    let course_id = required(request.course_id, "Course ID")?;
    let lesson_id = required(request.lesson_id, "Lesson ID")?;

    tracing::debug!(%user_id, %course_id, %lesson_id, "lesson chat");
    let response = state
        .services
        .tutor()
        .chat_in_lesson(course_id, lesson_id, &turns(request.history), &message)
        .await?;
    Ok(Json(ChatResponse { response }))
}

pub async fn general_chat(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<GeneralChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;
    let message = required(request.message, "Message")?;

    tracing::debug!(%user_id, "general chat");
    let response = state
        .services
        .tutor()
        .chat_general(&turns(request.history), &message)
        .await?;
    Ok(Json(ChatResponse { response }))
}
