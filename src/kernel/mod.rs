//! Dialogue kernel: the booking conversation as a pure state machine.
//!
//! Events go in through [`DialogueController::handle`], side effects come
//! out. Everything async lives in the session driver.

pub mod controller;
pub mod effect;
pub mod event;
pub mod normalizer;
pub mod presence;
pub mod slots;
pub mod state;
pub mod telemetry;
pub mod time;

pub use controller::{DialogueConfig, DialogueController};
pub use effect::SideEffect;
pub use event::DialogueEvent;
pub use presence::{ListenerGraph, ListenerState};
pub use slots::{SlotKey, SLOTS, SLOT_COUNT};
pub use state::{DialoguePhase, DialogueState, LogEntry, LogTag, Notice, NoticeLevel};
pub use time::RunId;
