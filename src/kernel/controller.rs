use std::time::Duration;

use chrono::FixedOffset;
use tracing::{debug, info, warn};

use crate::booking::{Booking, BookingDraft, BookingStatus, GuestCount};
use crate::dates::parse_booking_date;
use crate::weather::resolver::host_offset;
use crate::weather::{ForecastResolver, ForecastSample, SeatingAdvisor};

use super::effect::SideEffect;
use super::event::DialogueEvent;
use super::normalizer::{guest_count, normalize};
use super::presence::{ListenerGraph, ListenerRequest, ListenerState};
use super::slots::{SlotKey, SLOTS, SLOT_COUNT};
use super::state::{DialoguePhase, DialogueState, LogEntry, LogTag, Notice, StateDelta};
use super::telemetry::{ForecastOutcome, IgnoredKind, ResultKind, TelemetryEvent, TelemetryRecorder};
use super::time::{default_prompt_delay, RunId};

pub const GREETING: &str = "Hello! I am your AI assistant. I will help you book a table.";
pub const REVIEW_PROMPT: &str = "You can now review details and hit save booking.";
pub const MISSING_DETAILS: &str =
    "Some details like date or city are missing. Please fill them and then save the booking.";
pub const FORECAST_FAILED_SPOKEN: &str =
    "I could not fetch the weather. You can still review details and save the booking.";

pub const NOTICE_FETCHING: &str = "Fetching weather…";
pub const NOTICE_APPLIED: &str = "Weather fetched, suggestion applied.";
pub const NOTICE_FORECAST_FAILED: &str = "Weather fetch failed. You can still save the booking.";
pub const NOTICE_FILL_MANUALLY: &str = "Fill missing fields and save manually.";
pub const NOTICE_CREATED: &str = "Booking created.";
pub const NOTICE_CREATE_FAILED: &str = "Failed to create booking.";
pub const NOTICE_VOICE_UNAVAILABLE: &str = "Voice not available. Use the form.";
pub const NOTICE_EDIT_LATER_SLOT: &str = "Answer the current question before filling that field.";
pub const NOTICE_EDIT_WHILE_RESOLVING: &str = "Wait for the weather check before editing details.";
pub const NOTICE_COMMIT_MID_DIALOGUE: &str = "Finish the conversation first, or force the save.";

const LOG_LISTENING: &str = "Listening…";

#[derive(Debug, Clone)]
pub struct DialogueConfig {
    /// Pause between an accepted answer and the next prompt.
    pub prompt_delay: Duration,
    pub speech_input_available: bool,
    /// Offset whose calendar day and noon the forecast step uses.
    pub forecast_offset: FixedOffset,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            prompt_delay: default_prompt_delay(),
            speech_input_available: false,
            forecast_offset: host_offset(),
        }
    }
}

/// Booking conversation as a pure step function.
///
/// `handle` applies one event, mutates state only through
/// [`DialogueState::reduce`] and returns the side effects for the driver.
/// It never awaits I/O and never fails; problems become notices.
pub struct DialogueController {
    state: DialogueState,
    config: DialogueConfig,
    resolver: ForecastResolver,
    telemetry: TelemetryRecorder,
}

impl DialogueController {
    pub fn new(config: DialogueConfig) -> Self {
        let listener = if config.speech_input_available {
            ListenerState::Ready
        } else {
            ListenerState::Unavailable
        };
        Self {
            state: DialogueState::new(listener),
            resolver: ForecastResolver::new(config.forecast_offset),
            config,
            telemetry: TelemetryRecorder::new(),
        }
    }

    pub fn state(&self) -> &DialogueState {
        &self.state
    }

    pub fn config(&self) -> &DialogueConfig {
        &self.config
    }

    pub fn telemetry(&self) -> &TelemetryRecorder {
        &self.telemetry
    }

    pub fn start(&mut self) -> Vec<SideEffect> {
        self.handle(DialogueEvent::Start)
    }

    pub fn submit_answer(&mut self, raw: &str) -> Vec<SideEffect> {
        self.handle(DialogueEvent::utterance(raw))
    }

    pub fn commit(&mut self, force: bool) -> Vec<SideEffect> {
        self.handle(DialogueEvent::Commit { force })
    }

    pub fn handle(&mut self, event: DialogueEvent) -> Vec<SideEffect> {
        // Run guard: results requested under an older run are dropped.
        if let Some(run) = event.run() {
            let current = self.state.run();
            if run != current {
                let kind = match &event {
                    DialogueEvent::PromptDue { .. } => ResultKind::Prompt,
                    DialogueEvent::ForecastReceived { .. } | DialogueEvent::ForecastFailed { .. } => {
                        ResultKind::Forecast
                    }
                    _ => ResultKind::Booking,
                };
                debug!(result_run = run.seq, current_run = current.seq, ?kind, "dropping stale result");
                self.telemetry.record(TelemetryEvent::StaleResult {
                    kind,
                    result_run: run,
                    current_run: current,
                });
                return Vec::new();
            }
        }

        let mut fx = Vec::new();
        match event {
            DialogueEvent::Start => self.on_start(&mut fx),
            DialogueEvent::Utterance(text) => self.on_utterance(&text, &mut fx),

            DialogueEvent::ListenRequested => self.on_listen_requested(&mut fx),
            DialogueEvent::StopListening => {
                fx.push(SideEffect::StopListening);
                self.move_listener(ListenerRequest::Stop);
            }
            DialogueEvent::RecognitionStarted => {
                if self.move_listener(ListenerRequest::Started) {
                    self.log(LogTag::System, LOG_LISTENING);
                }
            }
            DialogueEvent::RecognitionEnded => {
                self.move_listener(ListenerRequest::Ended);
            }
            DialogueEvent::RecognitionError(reason) => {
                self.log(LogTag::System, format!("Speech error: {reason}"));
                self.telemetry.record(TelemetryEvent::RecognitionFailed);
                self.move_listener(ListenerRequest::Failed);
            }

            DialogueEvent::PromptDue { .. } => self.on_prompt_due(&mut fx),
            DialogueEvent::ForecastReceived { samples, .. } => self.on_forecast(&samples, &mut fx),
            DialogueEvent::ForecastFailed { reason, .. } => {
                if self.state.phase() == DialoguePhase::Resolving {
                    self.forecast_failed(&reason, &mut fx);
                }
            }

            DialogueEvent::FieldEdited { slot, value } => self.on_field_edited(slot, value, &mut fx),
            DialogueEvent::SeatingEdited(seating) => self.state.reduce(StateDelta::SeatingChanged(seating)),
            DialogueEvent::Commit { force } => self.on_commit(force, &mut fx),

            DialogueEvent::BookingCreated { run, booking } => self.on_booking_created(run, &booking, &mut fx),
            DialogueEvent::BookingFailed { run, reason } => {
                warn!(run = run.seq, %reason, "booking create failed");
                self.state.reduce(StateDelta::CommitInFlight(false));
                self.telemetry.record(TelemetryEvent::Booking { run, created: false });
                self.notify(Notice::warning(NOTICE_CREATE_FAILED), &mut fx);
            }
            DialogueEvent::RefreshBookings => fx.push(SideEffect::ListBookings),
            DialogueEvent::BookingsLoaded(bookings) => self.state.reduce(StateDelta::BookingsReplaced(bookings)),
        }
        fx
    }

    fn on_start(&mut self, fx: &mut Vec<SideEffect>) {
        let run = self.state.run().next();
        self.state.reduce(StateDelta::Reset { run });
        self.telemetry.record(TelemetryEvent::RunStarted { run });
        info!(run = run.seq, "conversation started");

        fx.push(SideEffect::CancelSpeech);
        self.speak(GREETING, fx);
        self.speak(SLOTS[0].prompt, fx);
    }

    fn on_utterance(&mut self, raw: &str, fx: &mut Vec<SideEffect>) {
        let raw = raw.trim();
        if ListenerGraph::is_active(self.state.listener()) {
            fx.push(SideEffect::StopListening);
            self.move_listener(ListenerRequest::Stop);
        }

        match self.state.phase() {
            DialoguePhase::AwaitingAnswer(i) if i < SLOT_COUNT => self.accept_answer(i, raw, fx),
            _ => self.ignore(IgnoredKind::UtteranceOutsideDialogue),
        }
    }

    fn accept_answer(&mut self, index: usize, raw: &str, fx: &mut Vec<SideEffect>) {
        let Some(slot) = SlotKey::at(index) else {
            return;
        };
        let value = normalize(slot, raw);
        let next = if index + 1 < SLOT_COUNT {
            DialoguePhase::AwaitingAnswer(index + 1)
        } else {
            DialoguePhase::Resolving
        };

        self.log(LogTag::User, raw);
        self.state.reduce(StateDelta::AnswerStored { slot, value });
        self.state.reduce(StateDelta::PhaseChanged(next));
        self.state.reduce(StateDelta::PromptPending(true));

        let run = self.state.run();
        self.telemetry.record(TelemetryEvent::AnswerAccepted { run, slot });
        debug!(run = run.seq, %slot, "answer accepted");

        fx.push(SideEffect::SchedulePrompt {
            run,
            after: self.config.prompt_delay,
        });
    }

    fn on_prompt_due(&mut self, fx: &mut Vec<SideEffect>) {
        if !self.state.prompt_pending() {
            self.ignore(IgnoredKind::PromptNotPending);
            return;
        }
        self.state.reduce(StateDelta::PromptPending(false));

        match self.state.phase() {
            DialoguePhase::AwaitingAnswer(i) => {
                if let Some(slot) = SlotKey::at(i) {
                    self.speak(slot.prompt(), fx);
                }
            }
            DialoguePhase::Resolving => self.begin_forecast(fx),
            DialoguePhase::Idle | DialoguePhase::Completed => {}
        }
    }

    fn begin_forecast(&mut self, fx: &mut Vec<SideEffect>) {
        let date = self.state.filled(SlotKey::BookingDate).map(str::to_string);
        let location = self.state.filled(SlotKey::Location).map(str::to_string);

        let (Some(date), Some(location)) = (date, location) else {
            let run = self.state.run();
            self.speak(MISSING_DETAILS, fx);
            self.notify(Notice::info(NOTICE_FILL_MANUALLY), fx);
            self.telemetry.record(TelemetryEvent::Forecast {
                run,
                outcome: ForecastOutcome::Skipped,
            });
            self.state.reduce(StateDelta::PhaseChanged(DialoguePhase::Completed));
            return;
        };

        if parse_booking_date(&date).is_none() {
            self.forecast_failed("booking date not recognised", fx);
            return;
        }

        self.notify(Notice::info(NOTICE_FETCHING), fx);
        fx.push(SideEffect::FetchForecast {
            run: self.state.run(),
            location,
        });
    }

    fn on_forecast(&mut self, samples: &[ForecastSample], fx: &mut Vec<SideEffect>) {
        if self.state.phase() != DialoguePhase::Resolving {
            return;
        }
        let date = self.state.filled(SlotKey::BookingDate).and_then(parse_booking_date);
        let location = self.state.filled(SlotKey::Location).map(str::to_string);
        let (Some(date), Some(location)) = (date, location) else {
            self.forecast_failed("booking date or location missing", fx);
            return;
        };

        let snapshot = match self.resolver.resolve(samples, date, &location) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.forecast_failed(&e.to_string(), fx);
                return;
            }
        };

        let run = self.state.run();
        let advice = SeatingAdvisor::advise(snapshot.condition);
        info!(
            run = run.seq,
            condition = snapshot.condition.as_str(),
            seating = advice.suggestion.as_str(),
            "seating suggestion applied"
        );
        self.telemetry.record(TelemetryEvent::Forecast {
            run,
            outcome: ForecastOutcome::Applied(snapshot.condition),
        });
        self.state.reduce(StateDelta::WeatherResolved {
            snapshot: Some(snapshot),
            seating: advice.suggestion,
        });

        self.speak(advice.rationale, fx);
        self.speak(REVIEW_PROMPT, fx);
        self.notify(Notice::info(NOTICE_APPLIED), fx);
        self.state.reduce(StateDelta::PhaseChanged(DialoguePhase::Completed));
    }

    fn forecast_failed(&mut self, reason: &str, fx: &mut Vec<SideEffect>) {
        let run = self.state.run();
        warn!(run = run.seq, %reason, "forecast step failed");
        self.telemetry.record(TelemetryEvent::Forecast {
            run,
            outcome: ForecastOutcome::Failed,
        });
        self.notify(Notice::warning(NOTICE_FORECAST_FAILED), fx);
        self.speak(FORECAST_FAILED_SPOKEN, fx);
        self.state.reduce(StateDelta::PhaseChanged(DialoguePhase::Completed));
    }

    fn on_listen_requested(&mut self, fx: &mut Vec<SideEffect>) {
        if self.state.listener() == ListenerState::Unavailable {
            self.ignore(IgnoredKind::ListenUnavailable);
            self.notify(Notice::warning(NOTICE_VOICE_UNAVAILABLE), fx);
            return;
        }
        if self.move_listener(ListenerRequest::Start) {
            fx.push(SideEffect::StartListening);
        } else {
            self.ignore(IgnoredKind::ListenWhileBusy);
        }
    }

    fn on_field_edited(&mut self, slot: SlotKey, value: String, fx: &mut Vec<SideEffect>) {
        match self.state.phase() {
            DialoguePhase::Idle | DialoguePhase::Completed => {
                self.state.reduce(StateDelta::AnswerStored { slot, value });
            }
            DialoguePhase::AwaitingAnswer(current) => {
                let index = slot.index();
                if index < current {
                    self.state.reduce(StateDelta::AnswerStored { slot, value });
                } else if index == current {
                    self.on_utterance(&value, fx);
                } else {
                    self.ignore(IgnoredKind::EditRejected);
                    self.notify(Notice::warning(NOTICE_EDIT_LATER_SLOT), fx);
                }
            }
            DialoguePhase::Resolving => {
                self.ignore(IgnoredKind::EditRejected);
                self.notify(Notice::warning(NOTICE_EDIT_WHILE_RESOLVING), fx);
            }
        }
    }

    fn on_commit(&mut self, force: bool, fx: &mut Vec<SideEffect>) {
        if self.state.commit_in_flight() {
            self.ignore(IgnoredKind::DuplicateCommit);
            return;
        }

        match self.state.phase() {
            DialoguePhase::Idle | DialoguePhase::Completed => {}
            DialoguePhase::AwaitingAnswer(_) | DialoguePhase::Resolving if force => {
                let run = self.state.run().next();
                info!(run = run.seq, "manual save overrides the conversation");
                self.state.reduce(StateDelta::RunSuperseded(run));
                self.state.reduce(StateDelta::PromptPending(false));
                self.state.reduce(StateDelta::PhaseChanged(DialoguePhase::Completed));
                self.telemetry.record(TelemetryEvent::ManualOverride { run });
                fx.push(SideEffect::CancelSpeech);
            }
            DialoguePhase::AwaitingAnswer(_) | DialoguePhase::Resolving => {
                self.ignore(IgnoredKind::CommitRejected);
                self.notify(Notice::warning(NOTICE_COMMIT_MID_DIALOGUE), fx);
                return;
            }
        }

        let draft = self.draft();
        self.state.reduce(StateDelta::CommitInFlight(true));
        fx.push(SideEffect::CreateBooking {
            run: self.state.run(),
            draft,
        });
    }

    fn on_booking_created(&mut self, run: RunId, booking: &Booking, fx: &mut Vec<SideEffect>) {
        self.state.reduce(StateDelta::CommitInFlight(false));
        self.telemetry.record(TelemetryEvent::Booking { run, created: true });
        self.speak(
            &format!(
                "Your table is booked, {}. Your booking ID is {}.",
                booking.customer_name, booking.booking_id
            ),
            fx,
        );
        self.notify(Notice::info(NOTICE_CREATED), fx);
        fx.push(SideEffect::ListBookings);
    }

    /// Packages the current slots for the create command. Validation is left
    /// to the booking service.
    pub fn draft(&self) -> BookingDraft {
        let text = |slot: SlotKey| self.state.filled(slot).map(str::to_string);

        BookingDraft {
            customer_name: text(SlotKey::CustomerName),
            number_of_guests: Some(GuestCount::Number(i64::from(guest_count(
                self.state.answer(SlotKey::NumberOfGuests).unwrap_or_default(),
            )))),
            booking_date: self
                .state
                .filled(SlotKey::BookingDate)
                .and_then(parse_booking_date)
                .map(|date| date.format("%Y-%m-%d").to_string()),
            booking_time: text(SlotKey::BookingTime),
            cuisine_preference: text(SlotKey::CuisinePreference),
            special_requests: Some(text(SlotKey::SpecialRequests).unwrap_or_default()),
            location: text(SlotKey::Location),
            weather_info: self.state.weather().cloned(),
            seating_preference: Some(self.state.seating()),
            status: Some(BookingStatus::Confirmed),
        }
    }

    fn speak(&mut self, text: &str, fx: &mut Vec<SideEffect>) {
        self.log(LogTag::Agent, text);
        fx.push(SideEffect::speak(text));
    }

    fn notify(&mut self, notice: Notice, fx: &mut Vec<SideEffect>) {
        self.state.reduce(StateDelta::NoticePosted(notice.clone()));
        fx.push(SideEffect::Notify(notice));
    }

    fn log(&mut self, tag: LogTag, message: impl Into<String>) {
        self.state.reduce(StateDelta::Logged(LogEntry::new(tag, message)));
    }

    fn ignore(&mut self, kind: IgnoredKind) {
        debug!(?kind, phase = ?self.state.phase(), "event ignored");
        self.telemetry.record(TelemetryEvent::Ignored { kind });
    }

    /// Applies a listener request through the graph. Returns whether it applied.
    fn move_listener(&mut self, request: ListenerRequest) -> bool {
        let from = self.state.listener();
        match ListenerGraph::transition(from, request) {
            Some(to) => {
                if to != from {
                    self.state.reduce(StateDelta::ListenerChanged(to));
                    self.telemetry.record(TelemetryEvent::ListenerTransition { from, to });
                }
                true
            }
            None => false,
        }
    }
}

impl Default for DialogueController {
    fn default() -> Self {
        Self::new(DialogueConfig::default())
    }
}
