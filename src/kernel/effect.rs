use std::time::Duration;

use crate::booking::BookingDraft;

use super::state::Notice;
use super::time::RunId;

/// Instructions for the session driver. The controller never performs I/O
/// itself; it returns these and the driver executes them in order.
#[derive(Debug, Clone)]
pub enum SideEffect {
    /// Queue text on the speech output.
    Speak(String),
    /// Drop anything still queued or playing.
    CancelSpeech,
    StartListening,
    StopListening,
    /// Post `PromptDue { run }` after `after`.
    SchedulePrompt { run: RunId, after: Duration },
    FetchForecast { run: RunId, location: String },
    CreateBooking { run: RunId, draft: BookingDraft },
    ListBookings,
    Notify(Notice),
}

impl SideEffect {
    pub fn speak(text: impl Into<String>) -> Self {
        SideEffect::Speak(text.into())
    }

    pub fn spoken_text(&self) -> Option<&str> {
        match self {
            SideEffect::Speak(text) => Some(text),
            _ => None,
        }
    }
}
