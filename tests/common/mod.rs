#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};

use voicebook::booking::{BookingService, InMemoryBookingRepository};
use voicebook::kernel::DialogueConfig;
use voicebook::speech::SpeechOutput;
use voicebook::weather::{ForecastProvider, ForecastSample, WeatherError};

pub const ANSWERS: [&str; 7] = [
    "my name is asha rao",
    "we are 4 people",
    "25 December 2025",
    "7:30 PM",
    "Italian",
    "birthday celebration",
    "Mumbai,IN",
];

pub fn ist() -> FixedOffset {
    FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap()
}

pub fn dialogue_config() -> DialogueConfig {
    DialogueConfig {
        prompt_delay: Duration::ZERO,
        speech_input_available: true,
        forecast_offset: ist(),
    }
}

fn at(ts: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Utc)
}

/// Three-hourly samples around Christmas 2025. Local noon in IST is 06:30Z;
/// the 06:00Z "clear sky" entry is nearest.
pub fn christmas_in_mumbai() -> Vec<ForecastSample> {
    vec![
        ForecastSample::new(at("2025-12-24T06:00:00Z"), "heavy storm", 24.0),
        ForecastSample::new(at("2025-12-25T03:00:00Z"), "broken clouds", 25.5),
        ForecastSample::new(at("2025-12-25T06:00:00Z"), "clear sky", 29.1),
        ForecastSample::new(at("2025-12-25T09:00:00Z"), "light rain", 27.0),
    ]
}

/// Provider returning canned samples, or a canned failure.
pub struct FixedForecast {
    samples: Vec<ForecastSample>,
    failure: Option<WeatherError>,
    delay: Duration,
    calls: AtomicUsize,
}

impl FixedForecast {
    pub fn new(samples: Vec<ForecastSample>) -> Self {
        Self {
            samples,
            failure: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: WeatherError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new(Vec::new())
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ForecastProvider for FixedForecast {
    async fn fetch(&self, _location: &str) -> Result<Vec<ForecastSample>, WeatherError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.failure {
            Some(WeatherError::NotConfigured) => Err(WeatherError::NotConfigured),
            Some(WeatherError::NoData) => Err(WeatherError::NoData),
            Some(other) => Err(WeatherError::Provider(other.to_string())),
            None => Ok(self.samples.clone()),
        }
    }
}

/// Speech output that remembers what it was asked to say.
#[derive(Default)]
pub struct RecordingSpeech {
    spoken: Mutex<Vec<String>>,
    cancels: AtomicUsize,
}

impl RecordingSpeech {
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn cancels(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechOutput for RecordingSpeech {
    async fn speak(&self, text: &str) -> anyhow::Result<()> {
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn in_memory_bookings() -> BookingService {
    BookingService::new(Arc::new(InMemoryBookingRepository::new()))
}
