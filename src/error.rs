use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

/// Failures of the validation, booking and query layers.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),
    #[error("Class not found")]
    ClassNotFound,
    #[error("Cannot book a past class")]
    ClassInPast,
    #[error("Class is fully booked")]
    ClassFull,
    #[error("User already booked this class")]
    DuplicateBooking,
    #[error("Invalid class type. Must be Yoga, Zumba, or HIIT")]
    InvalidClassType,
    #[error("Invalid date format. Use ISO format (e.g., 2025-06-07T15:00:00)")]
    InvalidDateTime,
    #[error("Cannot schedule class in the past")]
    ScheduleInPast,
    #[error("Capacity must be positive")]
    InvalidCapacity,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({ "error": msg }))).into_response()
    }
}

impl From<BookingError> for ApiError {
    fn from(value: BookingError) -> Self {
        match value {
            BookingError::Store(err) => {
                error!("Store error: {err}");
                ApiError::Internal("Internal server error".into())
            }
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        BookingError::Store(value).into()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        ApiError::BadRequest(value.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_are_bad_requests() {
        for err in [
            BookingError::MissingField("user_name"),
            BookingError::InvalidEmail,
            BookingError::ClassFull,
            BookingError::DuplicateBooking,
        ] {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_store_errors_are_internal() {
        let err = BookingError::Store(StoreError::Database(sqlx::Error::PoolClosed));
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
