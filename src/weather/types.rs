use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// One provider-returned forecast entry. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSample {
    pub timestamp: DateTime<Utc>,
    pub condition_text: Option<String>,
    pub temperature_celsius: Option<f64>,
    /// Provider entry as received, embedded into the snapshot for debugging.
    #[serde(default)]
    pub raw: serde_json::Value,
}

impl ForecastSample {
    /// Builds a sample with a provider-shaped `raw` payload.
    pub fn new(timestamp: DateTime<Utc>, condition_text: &str, temperature_celsius: f64) -> Self {
        Self {
            timestamp,
            condition_text: Some(condition_text.to_string()),
            temperature_celsius: Some(temperature_celsius),
            raw: json!({
                "dt": timestamp.timestamp(),
                "main": { "temp": temperature_celsius },
                "weather": [{ "description": condition_text }],
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    Sunny,
    Rainy,
    Other,
}

impl WeatherCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCondition::Sunny => "sunny",
            WeatherCondition::Rainy => "rainy",
            WeatherCondition::Other => "other",
        }
    }
}

/// The selected and classified sample, embedded by value into a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    #[serde(default, alias = "rawSample")]
    pub raw: serde_json::Value,
    pub condition: WeatherCondition,
    pub description: String,
    #[serde(default, alias = "temperatureCelsius")]
    pub temperature: Option<f64>,
}
