use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identifies one conversation. Bumped by every `Start`; async results carry
/// the run they were requested under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct RunId {
    pub seq: u64,
}

/// Pause between storing an answer and asking the next question, so the
/// speech-output command is not racing a re-armed recognizer.
pub const PROMPT_DELAY_MS: u64 = 300;

pub fn default_prompt_delay() -> Duration {
    Duration::from_millis(PROMPT_DELAY_MS)
}

impl RunId {
    pub fn new() -> Self {
        RunId { seq: 0 }
    }

    pub fn next(&self) -> Self {
        RunId { seq: self.seq + 1 }
    }
}
