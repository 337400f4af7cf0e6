use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::booking::{Booking, SeatingPreference};
use crate::weather::WeatherSnapshot;

use super::presence::ListenerState;
use super::slots::{SlotKey, SLOT_COUNT};
use super::time::RunId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DialoguePhase {
    #[default]
    Idle,
    /// Waiting for the answer to question `i`.
    AwaitingAnswer(usize),
    /// All slots asked; forecast step running.
    Resolving,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// User-facing status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, text: text.into() }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, text: text.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTag {
    Agent,
    User,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub tag: LogTag,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(tag: LogTag, message: impl Into<String>) -> Self {
        Self { tag, message: message.into(), at: Utc::now() }
    }
}

/// State delta. This is the only way dialogue state mutates.
#[derive(Debug, Clone)]
pub enum StateDelta {
    /// New conversation: slots, weather, log and notice cleared, first question armed.
    Reset { run: RunId },
    /// Run bumped without clearing anything (forced manual commit).
    RunSuperseded(RunId),
    PhaseChanged(DialoguePhase),
    AnswerStored { slot: SlotKey, value: String },
    PromptPending(bool),
    WeatherResolved { snapshot: Option<WeatherSnapshot>, seating: SeatingPreference },
    SeatingChanged(SeatingPreference),
    Logged(LogEntry),
    NoticePosted(Notice),
    ListenerChanged(ListenerState),
    CommitInFlight(bool),
    BookingsReplaced(Vec<Booking>),
}

#[derive(Debug, Clone, Default)]
pub struct DialogueState {
    run: RunId,
    phase: DialoguePhase,
    answers: BTreeMap<SlotKey, String>,
    weather: Option<WeatherSnapshot>,
    seating: SeatingPreference,
    prompt_pending: bool,
    commit_in_flight: bool,
    log: Vec<LogEntry>,
    notice: Option<Notice>,
    listener: ListenerState,
    bookings: Vec<Booking>,
    /// Bumped on every reduction.
    pub version: u64,
}

impl DialogueState {
    pub fn new(listener: ListenerState) -> Self {
        Self { listener, ..Self::default() }
    }

    pub fn reduce(&mut self, delta: StateDelta) {
        self.version += 1;

        match delta {
            StateDelta::Reset { run } => {
                self.run = run;
                self.phase = DialoguePhase::AwaitingAnswer(0);
                self.answers.clear();
                self.weather = None;
                self.seating = SeatingPreference::Unspecified;
                self.prompt_pending = false;
                self.commit_in_flight = false;
                self.log.clear();
                self.notice = None;
            }
            StateDelta::RunSuperseded(run) => self.run = run,
            StateDelta::PhaseChanged(phase) => self.phase = phase,
            StateDelta::AnswerStored { slot, value } => {
                self.answers.insert(slot, value);
            }
            StateDelta::PromptPending(pending) => self.prompt_pending = pending,
            StateDelta::WeatherResolved { snapshot, seating } => {
                self.weather = snapshot;
                self.seating = seating;
            }
            StateDelta::SeatingChanged(seating) => self.seating = seating,
            StateDelta::Logged(entry) => self.log.push(entry),
            StateDelta::NoticePosted(notice) => self.notice = Some(notice),
            StateDelta::ListenerChanged(listener) => self.listener = listener,
            StateDelta::CommitInFlight(flag) => self.commit_in_flight = flag,
            StateDelta::BookingsReplaced(bookings) => self.bookings = bookings,
        }
    }

    pub fn run(&self) -> RunId {
        self.run
    }

    pub fn phase(&self) -> DialoguePhase {
        self.phase
    }

    /// -1 before the first question, N once every slot has been asked.
    pub fn question_index(&self) -> isize {
        match self.phase {
            DialoguePhase::Idle => -1,
            DialoguePhase::AwaitingAnswer(i) => i as isize,
            DialoguePhase::Resolving | DialoguePhase::Completed => SLOT_COUNT as isize,
        }
    }

    pub fn answer(&self, slot: SlotKey) -> Option<&str> {
        self.answers.get(&slot).map(String::as_str)
    }

    /// Answer, trimmed, if non-empty.
    pub fn filled(&self, slot: SlotKey) -> Option<&str> {
        self.answer(slot).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn answers(&self) -> &BTreeMap<SlotKey, String> {
        &self.answers
    }

    pub fn weather(&self) -> Option<&WeatherSnapshot> {
        self.weather.as_ref()
    }

    pub fn seating(&self) -> SeatingPreference {
        self.seating
    }

    pub fn prompt_pending(&self) -> bool {
        self.prompt_pending
    }

    pub fn commit_in_flight(&self) -> bool {
        self.commit_in_flight
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn listener(&self) -> ListenerState {
        self.listener
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }
}
