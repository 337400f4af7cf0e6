mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use async_trait::async_trait;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{christmas_in_mumbai, in_memory_bookings, ist, FixedForecast};
use voicebook::booking::is_booking_id;
use voicebook::http::{build_router, AppState};
use voicebook::services::openweather::DEFAULT_BASE_URL;
use voicebook::services::OpenWeatherProvider;
use voicebook::weather::{ForecastProvider, ForecastResolver, ForecastSample, WeatherError, WeatherService};

fn app_with(provider: Arc<dyn ForecastProvider>) -> Router {
    build_router(AppState {
        bookings: in_memory_bookings(),
        weather: WeatherService::new(provider, ForecastResolver::new(ist())),
    })
}

/// Provider with a bug in it.
struct PanickingForecast;

#[async_trait]
impl ForecastProvider for PanickingForecast {
    async fn fetch(&self, _location: &str) -> Result<Vec<ForecastSample>, WeatherError> {
        panic!("forecast index out of range");
    }
}

fn app() -> Router {
    app_with(Arc::new(FixedForecast::new(christmas_in_mumbai())))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn payload() -> Value {
    json!({
        "customerName": "Asha Rao",
        "numberOfGuests": "4",
        "bookingDate": "2025-12-25",
        "bookingTime": "19:30",
        "cuisinePreference": "Italian",
        "location": "Mumbai,IN",
        "seatingPreference": "outdoor"
    })
}

#[tokio::test]
async fn test_health() {
    let (status, body) = call(&app(), Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_create_then_fetch_and_list() {
    let app = app();
    let (status, created) = call(&app, Method::POST, "/api/bookings", Some(payload())).await;
    assert_eq!(status, StatusCode::CREATED);

    let booking_id = created["bookingId"].as_str().unwrap().to_string();
    assert!(is_booking_id(&booking_id));
    assert_eq!(created["numberOfGuests"], 4);
    assert_eq!(created["specialRequests"], "");
    assert_eq!(created["status"], "confirmed");
    assert_eq!(created["seatingPreference"], "outdoor");
    assert!(created["createdAt"].is_string());

    let (status, fetched) = call(&app, Method::GET, &format!("/api/bookings/{booking_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    // The store key resolves to the same record.
    let key = created["id"].as_str().unwrap();
    let (status, by_key) = call(&app, Method::GET, &format!("/api/bookings/{key}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_key["bookingId"], booking_id.as_str());

    let mut second = payload();
    second["customerName"] = json!("Ravi");
    call(&app, Method::POST, "/api/bookings", Some(second)).await;

    let (status, list) = call(&app, Method::GET, "/api/bookings", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["customerName"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Ravi", "Asha Rao"]);
}

#[tokio::test]
async fn test_create_validation() {
    let app = app();

    let mut missing = payload();
    missing.as_object_mut().unwrap().remove("location");
    let (status, body) = call(&app, Method::POST, "/api/bookings", Some(missing)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing required fields.");

    let mut guests = payload();
    guests["numberOfGuests"] = json!(0);
    let (status, _) = call(&app, Method::POST, "/api/bookings", Some(guests)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut date = payload();
    date["bookingDate"] = json!("not a date");
    let (status, _) = call(&app, Method::POST, "/api/bookings", Some(date)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/bookings")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (_, list) = call(&app, Method::GET, "/api/bookings", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_cancel_is_soft_and_idempotent() {
    let app = app();
    let mut body = payload();
    body["weatherInfo"] = json!({
        "raw": { "dt": 1766642400, "weather": [{ "description": "clear sky" }] },
        "condition": "sunny",
        "description": "clear sky",
        "temperature": 29.1
    });
    let (_, created) = call(&app, Method::POST, "/api/bookings", Some(body)).await;
    assert_eq!(created["weatherInfo"]["condition"], "sunny");
    let uri = format!("/api/bookings/{}", created["bookingId"].as_str().unwrap());

    let (status, cancelled) = call(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");
    for field in [
        "id",
        "bookingId",
        "customerName",
        "numberOfGuests",
        "bookingDate",
        "bookingTime",
        "cuisinePreference",
        "specialRequests",
        "location",
        "weatherInfo",
        "seatingPreference",
        "createdAt",
    ] {
        assert_eq!(cancelled[field], created[field], "{field}");
    }
    let mut expected = created.clone();
    expected["status"] = json!("cancelled");
    expected["updatedAt"] = cancelled["updatedAt"].clone();
    assert_eq!(cancelled, expected);

    let (status, again) = call(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again, cancelled);

    let (_, fetched) = call(&app, Method::GET, &uri, None).await;
    assert_eq!(fetched["status"], "cancelled");
    let (_, list) = call(&app, Method::GET, "/api/bookings", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_booking_and_route() {
    let app = app();
    let (status, body) = call(&app, Method::GET, "/api/bookings/BK-0000-AAAAAA", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Booking not found.");

    let (status, _) = call(&app, Method::DELETE, "/api/bookings/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(&app, Method::GET, "/api/tables", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not found.");
}

#[tokio::test]
async fn test_weather_lookup() {
    let (status, body) = call(&app(), Method::GET, "/api/weather?date=2025-12-25&location=Mumbai,IN", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["seatingSuggestion"], "outdoor");
    assert_eq!(body["weatherInfo"]["condition"], "sunny");
    assert_eq!(body["weatherInfo"]["description"], "clear sky");
    assert_eq!(
        body["suggestionText"],
        "The weather looks great! Outdoor seating should be perfect."
    );

    // No offset: read as local time, so 01:00 IST is still the 25th.
    for date in ["2025-12-25T12:00:00", "2025-12-25T01:00:00"] {
        let uri = format!("/api/weather?date={date}&location=Mumbai,IN");
        let (status, local) = call(&app(), Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK, "{date}");
        assert_eq!(local, body, "{date}");
    }
}

#[tokio::test]
async fn test_weather_errors() {
    let app = app();
    for uri in ["/api/weather", "/api/weather?date=2025-12-25", "/api/weather?date=%20&location=Pune"] {
        let (status, body) = call(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["message"], "date and location are required query params.");
    }

    let (status, body) = call(&app, Method::GET, "/api/weather?date=someday&location=Pune", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid date format.");

    let empty = app_with(Arc::new(FixedForecast::new(Vec::new())));
    let (status, body) = call(&empty, Method::GET, "/api/weather?date=2025-12-25&location=Pune", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No forecast data available for the given date.");

    let unconfigured = app_with(Arc::new(OpenWeatherProvider::new(
        DEFAULT_BASE_URL,
        None,
        Duration::from_secs(1),
    )));
    let (status, body) = call(&unconfigured, Method::GET, "/api/weather?date=2025-12-25&location=Pune", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Weather API key not configured on server.");

    let failing = app_with(Arc::new(FixedForecast::failing(WeatherError::Provider("401".into()))));
    let (status, body) = call(&failing, Method::GET, "/api/weather?date=2025-12-25&location=Pune", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to fetch weather data.");
}

#[tokio::test]
async fn test_handler_panic_becomes_500() {
    let app = app_with(Arc::new(PanickingForecast));
    let (status, body) = call(&app, Method::GET, "/api/weather?date=2025-12-25&location=Pune", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "message": "Unexpected server error." }));

    // The router keeps serving after the panic.
    let (status, _) = call(&app, Method::GET, "/api/bookings", None).await;
    assert_eq!(status, StatusCode::OK);
}
