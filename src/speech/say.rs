use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::SpeechOutput;

struct Queued {
    text: String,
    generation: u64,
}

struct Playback {
    generation: AtomicU64,
    stop: Mutex<CancellationToken>,
}

/// Speaks through an external TTS command (`say` on macOS, `espeak` works too).
/// Utterances play one after another; `cancel` kills the current process and
/// discards everything queued before it.
pub struct SaySpeech {
    queue: mpsc::UnboundedSender<Queued>,
    playback: Arc<Playback>,
}

impl SaySpeech {
    /// Spawns the playback worker. Must be called inside a tokio runtime.
    pub fn spawn(program: impl Into<String>) -> Self {
        let program = program.into();
        let (queue, rx) = mpsc::unbounded_channel();
        let playback = Arc::new(Playback {
            generation: AtomicU64::new(0),
            stop: Mutex::new(CancellationToken::new()),
        });
        tokio::spawn(play_queue(program, rx, playback.clone()));
        Self { queue, playback }
    }
}

async fn play_queue(program: String, mut rx: mpsc::UnboundedReceiver<Queued>, playback: Arc<Playback>) {
    while let Some(item) = rx.recv().await {
        // Token first, then generation: a cancel in between still reaches us.
        let stop = playback.stop.lock().await.clone();
        if item.generation != playback.generation.load(Ordering::SeqCst) {
            continue;
        }

        let mut child = match Command::new(&program).arg(&item.text).kill_on_drop(true).spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(%program, error = %e, "failed to spawn speech process");
                continue;
            }
        };

        tokio::select! {
            status = child.wait() => {
                if let Err(e) = status {
                    warn!(error = %e, "speech process failed");
                }
            }
            _ = stop.cancelled() => {
                debug!("speech cancelled");
                let _ = child.kill().await;
            }
        }
    }
}

#[async_trait]
impl SpeechOutput for SaySpeech {
    async fn speak(&self, text: &str) -> anyhow::Result<()> {
        let generation = self.playback.generation.load(Ordering::SeqCst);
        self.queue
            .send(Queued { text: text.to_string(), generation })
            .map_err(|_| anyhow!("speech worker stopped"))
    }

    async fn cancel(&self) {
        self.playback.generation.fetch_add(1, Ordering::SeqCst);
        let mut stop = self.playback.stop.lock().await;
        stop.cancel();
        *stop = CancellationToken::new();
    }
}
