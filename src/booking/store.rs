use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::model::{Booking, BookingStatus};
use super::BookingError;

/// Durable store behind the booking service.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Fails with `Conflict` when the `booking_id` is already taken.
    async fn insert(&self, booking: Booking) -> Result<Booking, BookingError>;
    /// Most recently created first.
    async fn list(&self) -> Result<Vec<Booking>, BookingError>;
    /// Looks up by generated id or store key.
    async fn find(&self, key: &str) -> Result<Option<Booking>, BookingError>;
    async fn update_status(&self, key: &str, status: BookingStatus) -> Result<Booking, BookingError>;
}

/// Row set shared by both repositories.
#[derive(Debug, Default)]
struct BookingTable {
    rows: Vec<Booking>,
}

impl BookingTable {
    fn insert(&mut self, booking: Booking) -> Result<Booking, BookingError> {
        if self.rows.iter().any(|b| b.booking_id == booking.booking_id || b.id == booking.id) {
            return Err(BookingError::Conflict(booking.booking_id));
        }
        self.rows.push(booking.clone());
        Ok(booking)
    }

    fn sorted(&self) -> Vec<Booking> {
        // Newest insert first among equal timestamps.
        let mut rows: Vec<Booking> = self.rows.iter().rev().cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }

    fn find(&self, key: &str) -> Option<Booking> {
        self.rows.iter().find(|b| b.matches_key(key)).cloned()
    }

    /// Returns the updated row and whether it changed.
    fn update_status(&mut self, key: &str, status: BookingStatus) -> Result<(Booking, bool), BookingError> {
        let row = self
            .rows
            .iter_mut()
            .find(|b| b.matches_key(key))
            .ok_or_else(|| BookingError::NotFound(key.to_string()))?;
        let changed = row.transition_to(status, Utc::now())?;
        Ok((row.clone(), changed))
    }

    /// Puts back a row as it was before a failed write.
    fn restore(&mut self, previous: Booking) {
        if let Some(row) = self.rows.iter_mut().find(|b| b.id == previous.id) {
            *row = previous;
        }
    }
}

/// Process-local repository.
#[derive(Debug, Default)]
pub struct InMemoryBookingRepository {
    table: RwLock<BookingTable>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn insert(&self, booking: Booking) -> Result<Booking, BookingError> {
        self.table.write().await.insert(booking)
    }

    async fn list(&self) -> Result<Vec<Booking>, BookingError> {
        Ok(self.table.read().await.sorted())
    }

    async fn find(&self, key: &str) -> Result<Option<Booking>, BookingError> {
        Ok(self.table.read().await.find(key))
    }

    async fn update_status(&self, key: &str, status: BookingStatus) -> Result<Booking, BookingError> {
        self.table.write().await.update_status(key, status).map(|(row, _)| row)
    }
}

/// JSON snapshot on disk, rewritten after every mutation.
#[derive(Debug)]
pub struct JsonFileBookingRepository {
    path: PathBuf,
    table: RwLock<BookingTable>,
}

impl JsonFileBookingRepository {
    /// Opens the file, loading existing rows if present.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, BookingError> {
        let path = path.as_ref().to_path_buf();
        let rows = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Vec::new(),
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| BookingError::Storage(format!("corrupt booking file {}: {e}", path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(BookingError::Storage(e.to_string())),
        };
        info!(path = %path.display(), count = rows.len(), "booking file loaded");
        Ok(Self {
            path,
            table: RwLock::new(BookingTable { rows }),
        })
    }

    async fn save(&self, table: &BookingTable) -> Result<(), BookingError> {
        let json = serde_json::to_string_pretty(&table.rows).map_err(|e| BookingError::Storage(e.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| BookingError::Storage(e.to_string()))?;
        }
        // Atomic replace.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| BookingError::Storage(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| BookingError::Storage(e.to_string()))?;
        debug!(path = %self.path.display(), rows = table.rows.len(), "booking file saved");
        Ok(())
    }
}

#[async_trait]
impl BookingRepository for JsonFileBookingRepository {
    async fn insert(&self, booking: Booking) -> Result<Booking, BookingError> {
        let mut table = self.table.write().await;
        let saved = table.insert(booking)?;
        if let Err(e) = self.save(&table).await {
            table.rows.retain(|b| b.id != saved.id);
            return Err(e);
        }
        Ok(saved)
    }

    async fn list(&self) -> Result<Vec<Booking>, BookingError> {
        Ok(self.table.read().await.sorted())
    }

    async fn find(&self, key: &str) -> Result<Option<Booking>, BookingError> {
        Ok(self.table.read().await.find(key))
    }

    async fn update_status(&self, key: &str, status: BookingStatus) -> Result<Booking, BookingError> {
        let mut table = self.table.write().await;
        let previous = table.find(key);
        let (row, changed) = table.update_status(key, status)?;
        if changed {
            if let Err(e) = self.save(&table).await {
                if let Some(previous) = previous {
                    table.restore(previous);
                }
                return Err(e);
            }
        }
        Ok(row)
    }
}
