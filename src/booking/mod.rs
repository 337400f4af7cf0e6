pub mod id;
pub mod model;
pub mod service;
pub mod store;

pub use id::{is_booking_id, BookingIdGenerator};
pub use model::{Booking, BookingDraft, BookingStatus, GuestCount, NewBooking, SeatingPreference};
pub use service::BookingService;
pub use store::{BookingRepository, InMemoryBookingRepository, JsonFileBookingRepository};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("{0}")]
    Validation(String),
    #[error("booking {0} not found")]
    NotFound(String),
    #[error("booking id {0} already exists")]
    Conflict(String),
    #[error("booking storage failed: {0}")]
    Storage(String),
}
