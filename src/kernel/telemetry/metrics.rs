use std::collections::VecDeque;

use serde::Serialize;

use super::event::{ForecastOutcome, TelemetryEvent};
use crate::weather::WeatherCondition;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub runs_started: u64,
    pub answers_accepted: u64,
    pub ignored_events: u64,
    pub stale_results: u64,
    pub listener_transitions: u64,
    pub recognition_errors: u64,
    pub forecast_stats: ForecastStats,
    pub booking_stats: BookingStats,
    pub manual_overrides: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ForecastStats {
    pub applied: u64,
    pub failed: u64,
    pub skipped: u64,
    pub sunny: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookingStats {
    pub created: u64,
    pub failed: u64,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();

    for event in events {
        match event {
            TelemetryEvent::RunStarted { .. } => snap.runs_started += 1,
            TelemetryEvent::AnswerAccepted { .. } => snap.answers_accepted += 1,
            TelemetryEvent::Ignored { .. } => snap.ignored_events += 1,
            TelemetryEvent::StaleResult { .. } => snap.stale_results += 1,
            TelemetryEvent::ListenerTransition { .. } => snap.listener_transitions += 1,
            TelemetryEvent::RecognitionFailed => snap.recognition_errors += 1,
            TelemetryEvent::Forecast { outcome, .. } => match outcome {
                ForecastOutcome::Applied(condition) => {
                    snap.forecast_stats.applied += 1;
                    if *condition == WeatherCondition::Sunny {
                        snap.forecast_stats.sunny += 1;
                    }
                }
                ForecastOutcome::Failed => snap.forecast_stats.failed += 1,
                ForecastOutcome::Skipped => snap.forecast_stats.skipped += 1,
            },
            TelemetryEvent::Booking { created, .. } => {
                if *created {
                    snap.booking_stats.created += 1;
                } else {
                    snap.booking_stats.failed += 1;
                }
            }
            TelemetryEvent::ManualOverride { .. } => snap.manual_overrides += 1,
        }
    }

    snap
}
