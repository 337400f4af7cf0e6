use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::booking::SeatingPreference;

use super::provider::ForecastProvider;
use super::resolver::ForecastResolver;
use super::seating::SeatingAdvisor;
use super::types::{ForecastSample, WeatherSnapshot};
use super::WeatherError;

/// Body of a successful `/weather` lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherAssessment {
    pub weather_info: WeatherSnapshot,
    pub seating_suggestion: SeatingPreference,
    pub suggestion_text: String,
}

/// Forecast lookup, selection and seating advice in one call.
#[derive(Clone)]
pub struct WeatherService {
    provider: Arc<dyn ForecastProvider>,
    resolver: ForecastResolver,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn ForecastProvider>, resolver: ForecastResolver) -> Self {
        Self { provider, resolver }
    }

    pub fn resolver(&self) -> ForecastResolver {
        self.resolver
    }

    /// The calendar date an instant falls on in the resolver's local offset.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.resolver.offset()).date_naive()
    }

    pub async fn assess(&self, date: NaiveDate, location: &str) -> Result<WeatherAssessment, WeatherError> {
        let samples = self.provider.fetch(location).await.inspect_err(|e| {
            warn!(%location, error = %e, "forecast fetch failed");
        })?;
        let assessment = self.assess_samples(&samples, date, location)?;
        info!(
            %location,
            %date,
            condition = assessment.weather_info.condition.as_str(),
            seating = assessment.seating_suggestion.as_str(),
            "weather assessed"
        );
        Ok(assessment)
    }

    pub fn assess_samples(
        &self,
        samples: &[ForecastSample],
        date: NaiveDate,
        location: &str,
    ) -> Result<WeatherAssessment, WeatherError> {
        let snapshot = self.resolver.resolve(samples, date, location)?;
        let advice = SeatingAdvisor::advise(snapshot.condition);
        Ok(WeatherAssessment {
            weather_info: snapshot,
            seating_suggestion: advice.suggestion,
            suggestion_text: advice.rationale.to_string(),
        })
    }
}
