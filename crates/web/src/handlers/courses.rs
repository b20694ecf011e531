use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use scholar_core::model::{CourseId, LessonId};

use super::required;
use crate::AppState;
use crate::api_error::ApiError;
use crate::auth::{AuthUser, MaybeAuthUser};
use crate::dto::{
    CatalogEntryDto, CourseDetailDto, EnrollRequest, EnrollResponse, EnrollmentDto, LessonViewDto,
};

pub async fn list_courses(
    State(state): State<AppState>,
) -> Result<Json<Vec<CatalogEntryDto>>, ApiError> {
    let listings = state.services.catalog().list_catalog().await?;
    Ok(Json(listings.iter().map(CatalogEntryDto::from).collect()))
}

pub async fn course_detail(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    path: Result<Path<CourseId>, PathRejection>,
) -> Result<Json<CourseDetailDto>, ApiError> {
    let Path(course_id) = path?;
    let detail = state
        .services
        .catalog()
        .course_detail(course_id, viewer)
        .await?;
    Ok(Json(CourseDetailDto::from(&detail)))
}

pub async fn lesson(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    path: Result<Path<(CourseId, LessonId)>, PathRejection>,
) -> Result<Json<LessonViewDto>, ApiError> {
    let Path((course_id, lesson_id)) = path?;
    let view = state
        .services
        .catalog()
        .lesson_view(user_id, course_id, lesson_id)
        .await?;
    Ok(Json(LessonViewDto::from(&view)))
}

pub async fn enroll(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<EnrollRequest>, JsonRejection>,
) -> Result<Json<EnrollResponse>, ApiError> {
    let Json(request) = payload?;
    let course_id = required(request.course_id, "Course ID")?;

    let enrollment = state
        .services
        .enrollment()
        .enroll(user_id, course_id)
        .await?;
    Ok(Json(EnrollResponse {
        enrollment: EnrollmentDto::from(&enrollment),
    }))
}
