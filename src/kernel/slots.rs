use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Booking form fields collected by the dialogue, in question order.
/// `Ord` follows question order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotKey {
    CustomerName,
    NumberOfGuests,
    BookingDate,
    BookingTime,
    CuisinePreference,
    SpecialRequests,
    Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub key: SlotKey,
    pub prompt: &'static str,
}

pub const SLOTS: [Slot; 7] = [
    Slot { key: SlotKey::CustomerName, prompt: "What is your name?" },
    Slot { key: SlotKey::NumberOfGuests, prompt: "How many guests are you booking for?" },
    Slot {
        key: SlotKey::BookingDate,
        prompt: "On which date would you like to book the table? For example, say 25 December 2025.",
    },
    Slot { key: SlotKey::BookingTime, prompt: "At what time should I book the table?" },
    Slot {
        key: SlotKey::CuisinePreference,
        prompt: "What type of cuisine do you prefer? Indian, Italian or Chinese?",
    },
    Slot {
        key: SlotKey::SpecialRequests,
        prompt: "Any special requests such as birthday celebration or dietary restrictions?",
    },
    Slot {
        key: SlotKey::Location,
        prompt: "Which city are you in? I will check the weather for that location.",
    },
];

pub const SLOT_COUNT: usize = SLOTS.len();

impl SlotKey {
    pub fn index(&self) -> usize {
        SLOTS.iter().position(|s| s.key == *self).unwrap_or(SLOT_COUNT)
    }

    pub fn at(index: usize) -> Option<SlotKey> {
        SLOTS.get(index).map(|s| s.key)
    }

    pub fn prompt(&self) -> &'static str {
        SLOTS[self.index().min(SLOT_COUNT - 1)].prompt
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SlotKey::CustomerName => "customerName",
            SlotKey::NumberOfGuests => "numberOfGuests",
            SlotKey::BookingDate => "bookingDate",
            SlotKey::BookingTime => "bookingTime",
            SlotKey::CuisinePreference => "cuisinePreference",
            SlotKey::SpecialRequests => "specialRequests",
            SlotKey::Location => "location",
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SLOTS
            .iter()
            .map(|slot| slot.key)
            .find(|key| key.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown field {s:?}"))
    }
}
