use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dates::parse_instant;
use crate::weather::WeatherSnapshot;

use super::BookingError;

const MISSING_FIELDS: &str = "Missing required fields.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatingPreference {
    Indoor,
    Outdoor,
    #[default]
    Unspecified,
}

impl SeatingPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatingPreference::Indoor => "indoor",
            SeatingPreference::Outdoor => "outdoor",
            SeatingPreference::Unspecified => "unspecified",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "indoor" => Some(SeatingPreference::Indoor),
            "outdoor" => Some(SeatingPreference::Outdoor),
            "unspecified" => Some(SeatingPreference::Unspecified),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Confirmed,
    Pending,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Store key.
    pub id: Uuid,
    /// Human-readable identifier, e.g. `BK-K3F9-Q1Z8XA`.
    pub booking_id: String,
    pub customer_name: String,
    pub number_of_guests: u32,
    pub booking_date: DateTime<Utc>,
    pub booking_time: String,
    pub cuisine_preference: String,
    #[serde(default)]
    pub special_requests: String,
    pub location: String,
    #[serde(default)]
    pub weather_info: Option<WeatherSnapshot>,
    #[serde(default)]
    pub seating_preference: SeatingPreference,
    #[serde(default)]
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn from_new(new: NewBooking, booking_id: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            booking_id,
            customer_name: new.customer_name,
            number_of_guests: new.number_of_guests,
            booking_date: new.booking_date,
            booking_time: new.booking_time,
            cuisine_preference: new.cuisine_preference,
            special_requests: new.special_requests,
            location: new.location,
            weather_info: new.weather_info,
            seating_preference: new.seating_preference,
            status: new.status,
            created_at: now,
            updated_at: now,
        }
    }

    /// Matches either the generated id or the store key.
    pub fn matches_key(&self, key: &str) -> bool {
        self.booking_id == key || Uuid::parse_str(key).is_ok_and(|id| id == self.id)
    }

    /// Applies a status change. Returns whether anything changed.
    ///
    /// Same-status is a no-op; only a move into `Cancelled` is accepted and it
    /// is final.
    pub fn transition_to(&mut self, status: BookingStatus, now: DateTime<Utc>) -> Result<bool, BookingError> {
        if self.status == status {
            return Ok(false);
        }
        match (self.status, status) {
            (BookingStatus::Cancelled, _) => Err(BookingError::Validation(format!(
                "booking {} is cancelled and cannot change status",
                self.booking_id
            ))),
            (_, BookingStatus::Cancelled) => {
                self.status = BookingStatus::Cancelled;
                self.updated_at = now;
                Ok(true)
            }
            (from, to) => Err(BookingError::Validation(format!(
                "status cannot move from {from:?} to {to:?}"
            ))),
        }
    }
}

/// Guest count as sent by clients: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GuestCount {
    Number(i64),
    Text(String),
}

/// Create-booking payload, before validation. Every field is optional on the
/// wire so a missing field becomes a validation error rather than a parse error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub customer_name: Option<String>,
    pub number_of_guests: Option<GuestCount>,
    pub booking_date: Option<String>,
    pub booking_time: Option<String>,
    pub cuisine_preference: Option<String>,
    pub special_requests: Option<String>,
    pub location: Option<String>,
    pub weather_info: Option<WeatherSnapshot>,
    pub seating_preference: Option<SeatingPreference>,
    pub status: Option<BookingStatus>,
}

/// A draft that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub customer_name: String,
    pub number_of_guests: u32,
    pub booking_date: DateTime<Utc>,
    pub booking_time: String,
    pub cuisine_preference: String,
    pub special_requests: String,
    pub location: String,
    pub weather_info: Option<WeatherSnapshot>,
    pub seating_preference: SeatingPreference,
    pub status: BookingStatus,
}

fn required(field: Option<String>) -> Result<String, BookingError> {
    field
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| BookingError::Validation(MISSING_FIELDS.to_string()))
}

impl BookingDraft {
    pub fn validate(self) -> Result<NewBooking, BookingError> {
        let customer_name = required(self.customer_name)?;
        let booking_date = required(self.booking_date)?;
        let booking_time = required(self.booking_time)?;
        let cuisine_preference = required(self.cuisine_preference)?;
        let location = required(self.location)?;

        let number_of_guests = match self.number_of_guests {
            None => return Err(BookingError::Validation(MISSING_FIELDS.to_string())),
            Some(GuestCount::Number(n)) => n,
            Some(GuestCount::Text(text)) => text
                .trim()
                .parse::<i64>()
                .map_err(|_| BookingError::Validation(format!("numberOfGuests must be a number, got {text:?}")))?,
        };
        if number_of_guests < 1 {
            return Err(BookingError::Validation("numberOfGuests must be at least 1.".to_string()));
        }
        let number_of_guests = u32::try_from(number_of_guests)
            .map_err(|_| BookingError::Validation("numberOfGuests is too large.".to_string()))?;

        let booking_date = parse_instant(&booking_date)
            .ok_or_else(|| BookingError::Validation(format!("Invalid bookingDate {booking_date:?}.")))?;

        Ok(NewBooking {
            customer_name,
            number_of_guests,
            booking_date,
            booking_time,
            cuisine_preference,
            special_requests: self.special_requests.unwrap_or_default(),
            location,
            weather_info: self.weather_info,
            seating_preference: self.seating_preference.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> BookingDraft {
        BookingDraft {
            customer_name: Some("  Asha Rao ".into()),
            number_of_guests: Some(GuestCount::Number(4)),
            booking_date: Some("2025-12-25".into()),
            booking_time: Some("19:30".into()),
            cuisine_preference: Some("Italian".into()),
            special_requests: None,
            location: Some("Mumbai,IN".into()),
            ..Default::default()
        }
    }

    #[test]
    fn valid_draft_fills_defaults() {
        let new = draft().validate().unwrap();
        assert_eq!(new.customer_name, "Asha Rao");
        assert_eq!(new.number_of_guests, 4);
        assert_eq!(new.special_requests, "");
        assert_eq!(new.seating_preference, SeatingPreference::Unspecified);
        assert_eq!(new.status, BookingStatus::Confirmed);
    }

    #[test]
    fn missing_and_blank_fields_are_rejected() {
        let mut d = draft();
        d.location = None;
        assert!(matches!(d.validate(), Err(BookingError::Validation(m)) if m == MISSING_FIELDS));

        let mut d = draft();
        d.booking_time = Some("   ".into());
        assert!(matches!(d.validate(), Err(BookingError::Validation(_))));
    }

    #[test]
    fn guest_count_rules() {
        let mut d = draft();
        d.number_of_guests = Some(GuestCount::Text(" 6 ".into()));
        assert_eq!(d.validate().unwrap().number_of_guests, 6);

        let mut d = draft();
        d.number_of_guests = Some(GuestCount::Number(0));
        assert!(d.validate().is_err());

        let mut d = draft();
        d.number_of_guests = Some(GuestCount::Text("six".into()));
        assert!(d.validate().is_err());
    }

    #[test]
    fn cancelled_is_final() {
        let now = Utc::now();
        let mut booking = Booking::from_new(draft().validate().unwrap(), "BK-0000-AAAAAA".into(), now);

        assert!(booking.transition_to(BookingStatus::Cancelled, now).unwrap());
        assert!(!booking.transition_to(BookingStatus::Cancelled, now).unwrap());
        assert!(booking.transition_to(BookingStatus::Confirmed, now).is_err());
        assert_eq!(booking.status, BookingStatus::Cancelled);
    }

    #[test]
    fn key_matching() {
        let booking = Booking::from_new(draft().validate().unwrap(), "BK-0000-AAAAAA".into(), Utc::now());
        assert!(booking.matches_key("BK-0000-AAAAAA"));
        assert!(booking.matches_key(&booking.id.to_string()));
        assert!(!booking.matches_key("BK-0000-BBBBBB"));
    }
}
