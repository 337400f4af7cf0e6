//! Forecast selection and seating advice.
//!
//! The provider only supplies samples; everything that decides something
//! (which sample, which condition, which seat) is pure and lives in
//! `resolver` and `seating`.

pub mod provider;
pub mod resolver;
pub mod seating;
pub mod service;
pub mod types;

pub use provider::ForecastProvider;
pub use resolver::{classify, local_noon, ForecastResolver};
pub use seating::{SeatingAdvice, SeatingAdvisor};
pub use service::{WeatherAssessment, WeatherService};
pub use types::{ForecastSample, WeatherCondition, WeatherSnapshot};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("date and location are required query params.")]
    MissingParams,
    #[error("Invalid date format.")]
    InvalidDate(String),
    #[error("Weather API key not configured on server.")]
    NotConfigured,
    #[error("forecast provider failed: {0}")]
    Provider(String),
    #[error("No forecast data available for the given date.")]
    NoData,
}
