use axum::{Json, extract::State};

use crate::AppState;
use crate::api_error::ApiError;
use crate::auth::AuthUser;
use crate::dto::{CourseCardDto, DashboardDto, MyCoursesResponse};

pub async fn dashboard(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<DashboardDto>, ApiError> {
    let dashboard = state.services.dashboard().dashboard(user_id).await?;
    Ok(Json(DashboardDto::from(&dashboard)))
}

pub async fn my_courses(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MyCoursesResponse>, ApiError> {
    let cards = state.services.dashboard().my_courses(user_id).await?;
    Ok(Json(MyCoursesResponse {
        enrollments: cards.iter().map(CourseCardDto::from).collect(),
    }))
}
