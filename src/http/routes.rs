use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures::FutureExt;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::booking::{Booking, BookingDraft, BookingService};
use crate::dates::parse_instant_in;
use crate::weather::{WeatherAssessment, WeatherError, WeatherService};

use super::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub bookings: BookingService,
    pub weather: WeatherService,
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/{id}", get(get_booking).delete(cancel_booking))
        .route("/weather", get(weather));

    Router::new()
        .route("/", get(health))
        .nest("/api", api)
        .fallback(not_found)
        .layer(middleware::from_fn(catch_panics))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        %method,
        %path,
        status = response.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}

/// Turns a panicking handler into a 500 instead of a dropped connection.
async fn catch_panics(request: Request, next: Next) -> Response {
    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(payload) => ApiError::unexpected(&panic_message(payload.as_ref())).into_response(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Restaurant booking voice agent API",
    }))
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not found.")
}

async fn create_booking(
    State(state): State<AppState>,
    payload: Result<Json<BookingDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    let Json(draft) = payload?;
    let booking = state.bookings.create(draft).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn list_bookings(State(state): State<AppState>) -> Result<Json<Vec<Booking>>, ApiError> {
    Ok(Json(state.bookings.list().await?))
}

async fn get_booking(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Booking>, ApiError> {
    Ok(Json(state.bookings.get(&id).await?))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Booking>, ApiError> {
    Ok(Json(state.bookings.cancel(&id).await?))
}

#[derive(Debug, Deserialize)]
struct WeatherQuery {
    date: Option<String>,
    location: Option<String>,
}

async fn weather(
    State(state): State<AppState>,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let non_blank = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

    let (Some(date), Some(location)) = (non_blank(query.date), non_blank(query.location)) else {
        return Err(WeatherError::MissingParams.into());
    };
    let instant = parse_instant_in(&date, state.weather.resolver().offset())
        .ok_or(WeatherError::InvalidDate(date))?;

    let assessment: WeatherAssessment = state
        .weather
        .assess(state.weather.local_date(instant), &location)
        .await?;
    Ok(Json(assessment))
}
