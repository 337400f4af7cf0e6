use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::booking::{Booking, BookingService, SeatingPreference};
use crate::kernel::{
    DialogueController, DialogueEvent, DialoguePhase, DialogueState, ListenerState, Notice, NoticeLevel, RunId,
    SideEffect, SlotKey,
};
use crate::speech::{SpeechInput, SpeechOutput};
use crate::weather::{ForecastProvider, WeatherSnapshot};

pub const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Everything the driver talks to on the controller's behalf.
#[derive(Clone)]
pub struct SessionServices {
    pub speech: Arc<dyn SpeechOutput>,
    /// `None` when this host has no recognizer.
    pub listener: Option<Arc<dyn SpeechInput>>,
    pub bookings: BookingService,
    pub forecasts: Arc<dyn ForecastProvider>,
}

/// Read-only copy of the dialogue state, published after every change.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub run: RunId,
    pub phase: DialoguePhase,
    pub question_index: isize,
    pub answers: BTreeMap<SlotKey, String>,
    pub seating: SeatingPreference,
    pub weather: Option<WeatherSnapshot>,
    pub notice: Option<Notice>,
    pub listener: ListenerState,
    pub commit_in_flight: bool,
    pub bookings: Vec<Booking>,
    pub version: u64,
}

impl From<&DialogueState> for SessionView {
    fn from(state: &DialogueState) -> Self {
        Self {
            run: state.run(),
            phase: state.phase(),
            question_index: state.question_index(),
            answers: state.answers().clone(),
            seating: state.seating(),
            weather: state.weather().cloned(),
            notice: state.notice().cloned(),
            listener: state.listener(),
            commit_in_flight: state.commit_in_flight(),
            bookings: state.bookings().to_vec(),
            version: state.version,
        }
    }
}

pub fn event_channel() -> (mpsc::Sender<DialogueEvent>, mpsc::Receiver<DialogueEvent>) {
    mpsc::channel(EVENT_CHANNEL_CAPACITY)
}

/// Owns the controller for one session. Delivers events one at a time and
/// executes the returned side effects in order. Slow work runs in spawned
/// tasks that post their result back on the same channel, stamped with
/// the run they belong to.
pub struct SessionDriver {
    controller: DialogueController,
    services: SessionServices,
    receiver: mpsc::Receiver<DialogueEvent>,
    sender: mpsc::Sender<DialogueEvent>,
    views: watch::Sender<SessionView>,
}

impl SessionDriver {
    pub fn new(
        controller: DialogueController,
        services: SessionServices,
        receiver: mpsc::Receiver<DialogueEvent>,
        sender: mpsc::Sender<DialogueEvent>,
    ) -> Self {
        let (views, _) = watch::channel(SessionView::from(controller.state()));
        Self {
            controller,
            services,
            receiver,
            sender,
            views,
        }
    }

    pub fn controller(&self) -> &DialogueController {
        &self.controller
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.views.subscribe()
    }

    /// Runs until `shutdown` fires, then hands the controller back.
    pub async fn run(mut self, shutdown: CancellationToken) -> DialogueController {
        info!("session driver started");

        loop {
            let event = tokio::select! {
                _ = shutdown.cancelled() => break,
                event = self.receiver.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };
            self.step(event).await;
        }

        self.services.speech.cancel().await;
        info!("session driver stopped");
        self.controller
    }

    /// One event through the controller, then its effects.
    pub async fn step(&mut self, event: DialogueEvent) {
        let before = self.controller.state().version;
        let effects = self.controller.handle(event);
        if self.controller.state().version != before {
            self.views.send_replace(SessionView::from(self.controller.state()));
        }
        for effect in effects {
            self.execute(effect).await;
        }
    }

    async fn execute(&mut self, effect: SideEffect) {
        debug!(?effect, "executing side effect");

        match effect {
            SideEffect::Speak(text) => {
                if let Err(e) = self.services.speech.speak(&text).await {
                    warn!(error = %e, "speech output failed");
                }
            }
            SideEffect::CancelSpeech => self.services.speech.cancel().await,

            SideEffect::StartListening => match &self.services.listener {
                Some(listener) => {
                    if let Err(e) = listener.start().await {
                        warn!(error = %e, "speech input failed to start");
                        self.post_now(DialogueEvent::RecognitionError(e.to_string()));
                    }
                }
                None => debug!("no speech input configured"),
            },
            SideEffect::StopListening => {
                if let Some(listener) = &self.services.listener {
                    listener.stop().await;
                }
            }

            SideEffect::SchedulePrompt { run, after } => {
                let tx = self.sender.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    let _ = tx.send(DialogueEvent::PromptDue { run }).await;
                });
            }

            SideEffect::FetchForecast { run, location } => {
                let tx = self.sender.clone();
                let provider = self.services.forecasts.clone();
                tokio::spawn(async move {
                    let event = match provider.fetch(&location).await {
                        Ok(samples) => DialogueEvent::ForecastReceived { run, samples },
                        Err(e) => DialogueEvent::ForecastFailed {
                            run,
                            reason: e.to_string(),
                        },
                    };
                    let _ = tx.send(event).await;
                });
            }

            SideEffect::CreateBooking { run, draft } => {
                let tx = self.sender.clone();
                let bookings = self.services.bookings.clone();
                tokio::spawn(async move {
                    let event = match bookings.create(draft).await {
                        Ok(booking) => DialogueEvent::BookingCreated { run, booking },
                        Err(e) => DialogueEvent::BookingFailed {
                            run,
                            reason: e.to_string(),
                        },
                    };
                    let _ = tx.send(event).await;
                });
            }

            SideEffect::ListBookings => {
                let tx = self.sender.clone();
                let bookings = self.services.bookings.clone();
                tokio::spawn(async move {
                    match bookings.list().await {
                        Ok(list) => {
                            let _ = tx.send(DialogueEvent::BookingsLoaded(list)).await;
                        }
                        Err(e) => warn!(error = %e, "failed to load bookings"),
                    }
                });
            }

            SideEffect::Notify(notice) => match notice.level {
                NoticeLevel::Info => info!(notice = %notice.text, "status"),
                NoticeLevel::Warning => warn!(notice = %notice.text, "status"),
            },
        }
    }

    /// Posts without awaiting. The driver is the channel's only reader.
    fn post_now(&self, event: DialogueEvent) {
        if let Err(e) = self.sender.try_send(event) {
            warn!(error = %e, "event dropped");
        }
    }
}
