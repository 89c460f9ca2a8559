use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use serde::Deserialize;

use crate::routes::error_response;
use crate::services::weather_service::{WeatherError, WeatherService};

#[derive(Deserialize)]
pub struct WeatherQuery {
    city: Option<String>,
}

pub fn weather_error_response(err: &WeatherError) -> HttpResponse {
    match err {
        WeatherError::MissingCity => error_response(StatusCode::BAD_REQUEST, err.to_string()),
        WeatherError::CityNotFound(_) => error_response(StatusCode::NOT_FOUND, "City not found"),
        WeatherError::NotConfigured => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, err.to_string())
        }
        WeatherError::Upstream(_) | WeatherError::Http(_) => {
            log::error!("Weather lookup failed: {}", err);
            error_response(StatusCode::BAD_GATEWAY, "Failed to fetch weather data")
        }
    }
}

pub async fn get_weather(
    weather: web::Data<WeatherService>,
    params: web::Query<WeatherQuery>,
) -> impl Responder {
    let city = params.city.as_deref().unwrap_or_default();
    match weather.current_weather(city).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(err) => weather_error_response(&err),
    }
}
