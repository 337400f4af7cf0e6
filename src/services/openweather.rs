use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::weather::{ForecastProvider, ForecastSample, WeatherError};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// OpenWeatherMap 5 day / 3 hour forecast.
#[derive(Clone)]
pub struct OpenWeatherProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    list: Vec<Value>,
}

impl OpenWeatherProvider {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder().timeout(timeout).build().unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn forecast(&self, api_key: &str, location: &str) -> Result<Vec<ForecastSample>> {
        let response = self
            .client
            .get(format!("{}/forecast", self.base_url))
            .query(&[("q", location), ("appid", api_key), ("units", "metric")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("OpenWeatherMap error: {}", response.status()));
        }

        let body: ForecastResponse = response.json().await?;
        let total = body.list.len();
        let samples: Vec<ForecastSample> = body.list.into_iter().filter_map(sample_from_entry).collect();
        debug!(%location, total, usable = samples.len(), "forecast received");
        Ok(samples)
    }
}

/// One `list[]` entry. Entries without a usable `dt` are skipped.
fn sample_from_entry(entry: Value) -> Option<ForecastSample> {
    let timestamp = DateTime::from_timestamp(entry.get("dt")?.as_i64()?, 0)?;
    let condition_text = entry
        .pointer("/weather/0/description")
        .and_then(Value::as_str)
        .map(str::to_string);
    let temperature_celsius = entry.pointer("/main/temp").and_then(Value::as_f64);

    Some(ForecastSample {
        timestamp,
        condition_text,
        temperature_celsius,
        raw: entry,
    })
}

#[async_trait]
impl ForecastProvider for OpenWeatherProvider {
    async fn fetch(&self, location: &str) -> Result<Vec<ForecastSample>, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::NotConfigured)?;
        self.forecast(api_key, location).await.map_err(|e| {
            warn!(%location, error = %e, "OpenWeatherMap request failed");
            WeatherError::Provider(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entry_mapping() {
        let entry = json!({
            "dt": 1766653200,
            "main": { "temp": 29.4 },
            "weather": [{ "main": "Clear", "description": "clear sky" }]
        });
        let sample = sample_from_entry(entry.clone()).unwrap();
        assert_eq!(sample.timestamp.timestamp(), 1766653200);
        assert_eq!(sample.condition_text.as_deref(), Some("clear sky"));
        assert_eq!(sample.temperature_celsius, Some(29.4));
        assert_eq!(sample.raw, entry);

        assert!(sample_from_entry(json!({ "main": { "temp": 1.0 } })).is_none());
        let bare = sample_from_entry(json!({ "dt": 0 })).unwrap();
        assert_eq!(bare.condition_text, None);
    }
}
