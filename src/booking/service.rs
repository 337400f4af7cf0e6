use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::id::BookingIdGenerator;
use super::model::{Booking, BookingDraft, BookingStatus};
use super::store::BookingRepository;
use super::BookingError;

const ID_ATTEMPTS: usize = 3;

/// Validation and id assignment over a repository.
#[derive(Clone)]
pub struct BookingService {
    repository: Arc<dyn BookingRepository>,
    ids: BookingIdGenerator,
}

impl BookingService {
    pub fn new(repository: Arc<dyn BookingRepository>) -> Self {
        Self {
            repository,
            ids: BookingIdGenerator,
        }
    }

    pub async fn create(&self, draft: BookingDraft) -> Result<Booking, BookingError> {
        let new = draft.validate()?;

        let mut last_conflict = None;
        for _ in 0..ID_ATTEMPTS {
            let booking = Booking::from_new(new.clone(), self.ids.generate(), Utc::now());
            match self.repository.insert(booking).await {
                Ok(saved) => {
                    info!(booking_id = %saved.booking_id, guests = saved.number_of_guests, "booking created");
                    return Ok(saved);
                }
                Err(BookingError::Conflict(id)) => {
                    warn!(booking_id = %id, "booking id collision, regenerating");
                    last_conflict = Some(id);
                }
                Err(e) => return Err(e),
            }
        }
        Err(BookingError::Conflict(last_conflict.unwrap_or_default()))
    }

    pub async fn list(&self) -> Result<Vec<Booking>, BookingError> {
        self.repository.list().await
    }

    pub async fn get(&self, key: &str) -> Result<Booking, BookingError> {
        self.repository
            .find(key)
            .await?
            .ok_or_else(|| BookingError::NotFound(key.to_string()))
    }

    /// Soft delete. Cancelling twice returns the same record.
    pub async fn cancel(&self, key: &str) -> Result<Booking, BookingError> {
        let booking = self.repository.update_status(key, BookingStatus::Cancelled).await?;
        info!(booking_id = %booking.booking_id, "booking cancelled");
        Ok(booking)
    }
}
