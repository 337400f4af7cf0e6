use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::warn;

use crate::kernel::DialogueEvent;

use super::{SpeechInput, SpeechOutput};

/// Prints agent speech to stdout.
#[derive(Debug, Default, Clone)]
pub struct ConsoleSpeech;

#[async_trait]
impl SpeechOutput for ConsoleSpeech {
    async fn speak(&self, text: &str) -> anyhow::Result<()> {
        println!("[agent] {text}");
        Ok(())
    }

    async fn cancel(&self) {}
}

/// Terminal stand-in for a recognizer. Lines typed on stdin are the
/// transcripts; this only reports the listening lifecycle.
#[derive(Debug, Clone)]
pub struct ConsoleListener {
    events: mpsc::Sender<DialogueEvent>,
}

impl ConsoleListener {
    pub fn new(events: mpsc::Sender<DialogueEvent>) -> Self {
        Self { events }
    }

    fn post(&self, event: DialogueEvent) {
        // The driver is the only consumer and may be the caller; never block on it.
        if let Err(e) = self.events.try_send(event) {
            warn!(error = %e, "listener event dropped");
        }
    }
}

#[async_trait]
impl SpeechInput for ConsoleListener {
    async fn start(&self) -> anyhow::Result<()> {
        println!("[mic] listening, type your answer");
        self.post(DialogueEvent::RecognitionStarted);
        Ok(())
    }

    async fn stop(&self) {
        self.post(DialogueEvent::RecognitionEnded);
    }
}
