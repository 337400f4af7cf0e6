//! Speech capabilities, injected into the session driver.

pub mod console;
pub mod say;

pub use console::{ConsoleListener, ConsoleSpeech};
pub use say::SaySpeech;

use async_trait::async_trait;

/// Text-to-speech. `speak` queues and returns once the text is dispatched;
/// it does not wait for playback to finish.
#[async_trait]
pub trait SpeechOutput: Send + Sync {
    async fn speak(&self, text: &str) -> anyhow::Result<()>;
    /// Drops queued text and stops whatever is playing.
    async fn cancel(&self);
}

/// Speech recognition. Results and lifecycle callbacks arrive as
/// `DialogueEvent`s on the session channel, not as return values.
#[async_trait]
pub trait SpeechInput: Send + Sync {
    async fn start(&self) -> anyhow::Result<()>;
    async fn stop(&self);
}
