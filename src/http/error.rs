use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::booking::BookingError;
use crate::weather::WeatherError;

const INTERNAL: &str = "Internal server error.";
const UNEXPECTED: &str = "Unexpected server error.";

/// JSON error body, `{ "message": ... }`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub message: String,
    #[serde(skip)]
    status: StatusCode,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    fn internal(detail: &dyn std::fmt::Display) -> Self {
        error!(error = %detail, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL)
    }

    /// A handler panicked. Nothing about the failure reaches the client.
    pub(crate) fn unexpected(detail: &str) -> Self {
        error!(panic = %detail, "handler panicked");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, UNEXPECTED)
    }
}

impl From<BookingError> for ApiError {
    fn from(e: BookingError) -> Self {
        match e {
            BookingError::Validation(message) => Self::new(StatusCode::BAD_REQUEST, message),
            BookingError::NotFound(_) => Self::not_found("Booking not found."),
            BookingError::Conflict(_) => Self::new(StatusCode::CONFLICT, e.to_string()),
            BookingError::Storage(_) => Self::internal(&e),
        }
    }
}

impl From<WeatherError> for ApiError {
    fn from(e: WeatherError) -> Self {
        match e {
            WeatherError::MissingParams | WeatherError::InvalidDate(_) => {
                Self::new(StatusCode::BAD_REQUEST, e.to_string())
            }
            WeatherError::NoData => Self::not_found(e.to_string()),
            WeatherError::NotConfigured => {
                error!("weather lookup requested without an API key");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            WeatherError::Provider(detail) => {
                error!(error = %detail, "weather provider failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch weather data.")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}
