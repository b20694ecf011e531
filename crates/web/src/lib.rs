#![forbid(unsafe_code)]

//! HTTP surface of the learning platform.

pub mod api_error;
pub mod auth;
pub mod dto;
mod handlers;

use axum::{
    Router,
    extract::FromRef,
    routing::{get, post},
};
use services::AppServices;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub use api_error::ApiError;
pub use auth::{AuthKeys, AuthUser, Claims, MaybeAuthUser};

#[derive(Clone)]
pub struct AppState {
    pub services: AppServices,
    pub auth: AuthKeys,
}

impl AppState {
    #[must_use]
    pub fn new(services: AppServices, auth: AuthKeys) -> Self {
        Self { services, auth }
    }
}

impl FromRef<AppState> for AuthKeys {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        // Catalog
        .route("/courses", get(handlers::courses::list_courses))
        .route("/courses/enroll", post(handlers::courses::enroll))
        .route("/courses/{course_id}", get(handlers::courses::course_detail))
        .route(
            "/courses/{course_id}/lessons/{lesson_id}",
            get(handlers::courses::lesson),
        )
        // Progress
        .route("/progress/complete", post(handlers::progress::complete_lesson))
        .route("/dashboard", get(handlers::dashboard::dashboard))
        .route("/my-courses", get(handlers::dashboard::my_courses))
        // Tutor
        .route("/ai/chat", post(handlers::chat::lesson_chat))
        .route("/ai/chat-general", post(handlers::chat::general_chat))
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".into())
}

/// Build the application router with request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .fallback(not_found)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
