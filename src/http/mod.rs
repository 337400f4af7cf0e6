//! Booking and weather API under `/api`.

pub mod error;
pub mod routes;

pub use error::ApiError;
pub use routes::{build_router, AppState};
