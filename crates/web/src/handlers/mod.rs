pub mod chat;
pub mod courses;
pub mod dashboard;
pub mod health;
pub mod progress;

use crate::api_error::ApiError;

fn required<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::missing(field))
}
