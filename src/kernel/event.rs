use crate::booking::{Booking, SeatingPreference};
use crate::weather::ForecastSample;

use super::slots::SlotKey;
use super::time::RunId;

/// Everything the dialogue controller reacts to. Async results carry the run
/// they were requested under.
#[derive(Debug, Clone)]
pub enum DialogueEvent {
    /// Hard reset and greet.
    Start,
    /// One unit of user speech, already text. Typed answers use the same path.
    Utterance(String),

    // Speech-input capability
    ListenRequested,
    StopListening,
    RecognitionStarted,
    RecognitionEnded,
    RecognitionError(String),

    PromptDue { run: RunId },
    ForecastReceived { run: RunId, samples: Vec<ForecastSample> },
    ForecastFailed { run: RunId, reason: String },

    // Manual form
    FieldEdited { slot: SlotKey, value: String },
    SeatingEdited(SeatingPreference),
    Commit { force: bool },

    BookingCreated { run: RunId, booking: Booking },
    BookingFailed { run: RunId, reason: String },
    RefreshBookings,
    BookingsLoaded(Vec<Booking>),
}

impl DialogueEvent {
    pub fn utterance(text: impl Into<String>) -> Self {
        DialogueEvent::Utterance(text.into())
    }

    /// Run stamp of async results; `None` for user and capability events.
    pub fn run(&self) -> Option<RunId> {
        match self {
            DialogueEvent::PromptDue { run }
            | DialogueEvent::ForecastReceived { run, .. }
            | DialogueEvent::ForecastFailed { run, .. }
            | DialogueEvent::BookingCreated { run, .. }
            | DialogueEvent::BookingFailed { run, .. } => Some(*run),
            _ => None,
        }
    }
}
