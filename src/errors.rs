use crate::models::Symptom;
use axum::http::StatusCode;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{symptom} must be between 0 and 3, got {value}")]
    RatingOutOfRange { symptom: Symptom, value: i64 },
    #[error(
        "window must be between 1 and {max} days, got {days}",
        max = crate::models::Window::MAX_DAYS
    )]
    InvalidWindow { days: i64 },
    #[error("anchor {anchor} leaves no room for a {days}-day window")]
    AnchorOutOfRange { anchor: NaiveDate, days: usize },
    #[error("total score must be between 0 and 12, got {0}")]
    ScoreOutOfRange(i64),
    #[error("total score must be a whole number, got {0}")]
    FractionalScore(f64),
    #[error("average must be between 0 and 3, got {0}")]
    AverageOutOfRange(f64),
    #[error("invalid month {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },
    #[error("subject id must not be empty")]
    EmptySubject,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        tracing::warn!("rejected input: {err}");
        Self::bad_request(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_error_names_the_field() {
        let err = ValidationError::RatingOutOfRange {
            symptom: Symptom::Fatigue,
            value: 7,
        };
        assert_eq!(err.to_string(), "fatigue must be between 0 and 3, got 7");
    }

    #[test]
    fn validation_error_maps_to_bad_request() {
        let err: AppError = ValidationError::InvalidWindow { days: -1 }.into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.contains("-1"));
    }
}
