pub mod booking;
pub mod config;
pub mod dates;
pub mod driver;
pub mod http;
pub mod kernel;
pub mod services;
pub mod speech;
pub mod weather;

pub use config::AppConfig;
pub use driver::{SessionDriver, SessionServices};
pub use kernel::{DialogueController, DialogueEvent, SideEffect};

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use booking::{BookingRepository, BookingService, InMemoryBookingRepository, JsonFileBookingRepository};
use services::OpenWeatherProvider;
use weather::{ForecastResolver, WeatherService};

/// `RUST_LOG` filter, `info` when unset.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Repository selected by `BOOKINGS_FILE`.
pub async fn booking_service(config: &AppConfig) -> Result<BookingService> {
    let repository: Arc<dyn BookingRepository> = match &config.bookings_file {
        Some(path) => Arc::new(JsonFileBookingRepository::open(path).await?),
        None => Arc::new(InMemoryBookingRepository::new()),
    };
    Ok(BookingService::new(repository))
}

pub fn forecast_provider(config: &AppConfig) -> OpenWeatherProvider {
    OpenWeatherProvider::new(
        config.weather_api_base_url.clone(),
        config.weather_api_key.clone(),
        config.weather_timeout,
    )
}

pub fn weather_service(config: &AppConfig) -> WeatherService {
    WeatherService::new(
        Arc::new(forecast_provider(config)),
        ForecastResolver::new(config.forecast_offset),
    )
}
