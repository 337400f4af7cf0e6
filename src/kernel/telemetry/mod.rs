//! Dialogue telemetry.
//!
//! # SAFETY INVARIANT
//! Telemetry is a write-only side layer. The controller never reads it back
//! when deciding what to do.
//!
//! # PRIVACY INVARIANT
//! Events carry run ids, slot keys and enums only. Never utterances, names
//! or locations.

pub mod event;
pub mod metrics;
pub mod recorder;

pub use event::{ForecastOutcome, IgnoredKind, ResultKind, TelemetryEvent};
pub use metrics::TelemetrySnapshot;
pub use recorder::TelemetryRecorder;
