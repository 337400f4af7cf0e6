use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::FixedOffset;
use thiserror::Error;

use crate::kernel::time::PROMPT_DELAY_MS;
use crate::services::openweather::DEFAULT_BASE_URL;
use crate::weather::resolver::host_offset;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid {key}={value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeechBackend {
    #[default]
    Console,
    /// External TTS command, `say` by default.
    Say,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub weather_api_key: Option<String>,
    pub weather_api_base_url: String,
    pub weather_timeout: Duration,
    /// JSON file store when set, in-memory otherwise.
    pub bookings_file: Option<PathBuf>,
    pub forecast_offset: FixedOffset,
    pub prompt_delay: Duration,
    pub speech_backend: SpeechBackend,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 5000,
            weather_api_key: None,
            weather_api_base_url: DEFAULT_BASE_URL.to_string(),
            weather_timeout: Duration::from_secs(10),
            bookings_file: None,
            forecast_offset: host_offset(),
            prompt_delay: Duration::from_millis(PROMPT_DELAY_MS),
            speech_backend: SpeechBackend::Console,
        }
    }
}

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Unset or blank keys
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(v) = get("HOST") {
            config.host = parse("HOST", &v)?;
        }
        if let Some(v) = get("PORT") {
            config.port = parse("PORT", &v)?;
        }
        config.weather_api_key = get("WEATHER_API_KEY");
        if let Some(v) = get("WEATHER_API_BASE_URL") {
            config.weather_api_base_url = v;
        }
        if let Some(v) = get("WEATHER_TIMEOUT_SECS") {
            config.weather_timeout = Duration::from_secs(parse("WEATHER_TIMEOUT_SECS", &v)?);
        }
        config.bookings_file = get("BOOKINGS_FILE").map(PathBuf::from);
        if let Some(v) = get("FORECAST_UTC_OFFSET") {
            config.forecast_offset = parse_offset(&v).ok_or_else(|| ConfigError::Invalid {
                key: "FORECAST_UTC_OFFSET",
                value: v.clone(),
                reason: "expected an offset such as +05:30 or -0800".to_string(),
            })?;
        }
        if let Some(v) = get("PROMPT_DELAY_MS") {
            config.prompt_delay = Duration::from_millis(parse("PROMPT_DELAY_MS", &v)?);
        }
        if let Some(v) = get("SPEECH_BACKEND") {
            config.speech_backend = match v.to_lowercase().as_str() {
                "console" => SpeechBackend::Console,
                "say" => SpeechBackend::Say,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "SPEECH_BACKEND",
                        value: v,
                        reason: "expected console or say".to_string(),
                    })
                }
            };
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// "+05:30", "-0800", "+5", "Z" or "UTC".
pub fn parse_offset(text: &str) -> Option<FixedOffset> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("z") || text.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match text.as_bytes().first()? {
        b'+' => (1, &text[1..]),
        b'-' => (-1, &text[1..]),
        _ => (1, text),
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "0"),
    };
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 14 || minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
