use async_trait::async_trait;

use super::types::ForecastSample;
use super::WeatherError;

/// Source of forecast samples for a location. Order of the returned list is
/// not relied upon.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<Vec<ForecastSample>, WeatherError>;
}
