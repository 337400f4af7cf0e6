use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeDelta, TimeZone, Utc};
use tracing::debug;

use super::types::{ForecastSample, WeatherCondition, WeatherSnapshot};
use super::WeatherError;

pub const NO_DESCRIPTION: &str = "N/A";

/// Keyword rules, evaluated top to bottom. The first rule with a matching
/// keyword wins, so "sunny with light rain" is Sunny.
const CONDITION_RULES: &[(&[&str], WeatherCondition)] = &[
    (&["sun", "clear"], WeatherCondition::Sunny),
    (&["rain", "storm"], WeatherCondition::Rainy),
];

/// Case-insensitive substring classification of a free-text description.
pub fn classify(description: &str) -> WeatherCondition {
    let lowered = description.to_lowercase();
    CONDITION_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(_, condition)| *condition)
        .unwrap_or(WeatherCondition::Other)
}

/// 12:00:00.000 of `date` in the given offset, expressed in UTC.
pub fn local_noon(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let noon = date.and_hms_opt(12, 0, 0).unwrap_or_default();
    let utc_naive = noon - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
    Utc.from_utc_datetime(&utc_naive)
}

/// The host's current UTC offset.
pub fn host_offset() -> FixedOffset {
    *Local::now().offset()
}

/// Picks the sample nearest to local noon of a date and classifies it.
#[derive(Debug, Clone, Copy)]
pub struct ForecastResolver {
    offset: FixedOffset,
}

impl ForecastResolver {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self::new(FixedOffset::east_opt(0).unwrap_or_else(host_offset))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Scans in input order and keeps the strictly smallest distance to noon;
    /// equal distances never replace the current best.
    pub fn select<'a>(&self, samples: &'a [ForecastSample], date: NaiveDate) -> Option<&'a ForecastSample> {
        let target = local_noon(date, self.offset);
        let mut best: Option<(&ForecastSample, u64)> = None;

        for sample in samples {
            let diff = sample.timestamp.signed_duration_since(target).num_milliseconds().unsigned_abs();
            match best {
                Some((_, best_diff)) if diff >= best_diff => {}
                _ => best = Some((sample, diff)),
            }
        }

        best.map(|(sample, _)| sample)
    }

    /// `location` only identifies the request in logs; the samples were
    /// already fetched for it.
    pub fn resolve(
        &self,
        samples: &[ForecastSample],
        date: NaiveDate,
        location: &str,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let best = self.select(samples, date).ok_or(WeatherError::NoData)?;

        let description = best
            .condition_text
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(NO_DESCRIPTION);
        let condition = classify(description);
        debug!(%location, %date, at = %best.timestamp, condition = condition.as_str(), "forecast sample selected");

        Ok(WeatherSnapshot {
            raw: best.raw.clone(),
            condition,
            description: description.to_string(),
            temperature: best.temperature_celsius,
        })
    }
}

impl Default for ForecastResolver {
    fn default() -> Self {
        Self::new(host_offset())
    }
}
