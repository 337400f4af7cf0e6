use serde::{Deserialize, Serialize};

use crate::kernel::presence::ListenerState;
use crate::kernel::slots::SlotKey;
use crate::kernel::time::RunId;
use crate::weather::WeatherCondition;

// Allowed: ids, slot keys, enums, counts.
// Forbidden: utterances, names, locations, any free text from the user.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TelemetryEvent {
    RunStarted { run: RunId },

    AnswerAccepted { run: RunId, slot: SlotKey },

    /// An event that had no effect in the current phase.
    Ignored { kind: IgnoredKind },

    /// Async result from a superseded run.
    StaleResult { kind: ResultKind, result_run: RunId, current_run: RunId },

    ListenerTransition { from: ListenerState, to: ListenerState },

    RecognitionFailed,

    Forecast { run: RunId, outcome: ForecastOutcome },

    Booking { run: RunId, created: bool },

    ManualOverride { run: RunId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnoredKind {
    UtteranceOutsideDialogue,
    ListenWhileBusy,
    ListenUnavailable,
    EditRejected,
    CommitRejected,
    DuplicateCommit,
    PromptNotPending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultKind {
    Prompt,
    Forecast,
    Booking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForecastOutcome {
    Applied(WeatherCondition),
    Failed,
    Skipped,
}
