use anyhow::Context;
use tracing::info;

use voicebook::http::{build_router, AppState};
use voicebook::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    voicebook::init_tracing();

    let config = AppConfig::from_env()?;
    let state = AppState {
        bookings: voicebook::booking_service(&config).await?,
        weather: voicebook::weather_service(&config),
    };
    if config.weather_api_key.is_none() {
        tracing::warn!("WEATHER_API_KEY not set, /api/weather will answer 500");
    }

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(addr = %listener.local_addr()?, "booking API listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    info!("booking API shut down");
    Ok(())
}
