use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Weather service not configured")]
    NotConfigured,

    #[error("Please enter a city name")]
    MissingCity,

    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Weather provider returned {0}")]
    Upstream(u16),

    #[error("Failed to fetch weather data: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct OpenWeatherResponse {
    name: String,
    main: OpenWeatherMain,
    weather: Vec<OpenWeatherCondition>,
    wind: OpenWeatherWind,
    sys: Option<OpenWeatherSys>,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherCondition {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherSys {
    country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub city: String,
    pub country: Option<String>,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_percent: f64,
    pub pressure_hpa: f64,
    pub wind_speed_ms: f64,
    pub conditions: String,
    pub description: String,
    pub icon_url: Option<String>,
}

impl From<OpenWeatherResponse> for WeatherReport {
    fn from(response: OpenWeatherResponse) -> Self {
        let condition = response.weather.into_iter().next();
        WeatherReport {
            city: response.name,
            country: response.sys.and_then(|sys| sys.country),
            temperature_c: response.main.temp,
            feels_like_c: response.main.feels_like,
            humidity_percent: response.main.humidity,
            pressure_hpa: response.main.pressure,
            wind_speed_ms: response.wind.speed,
            conditions: condition.as_ref().map(|c| c.main.clone()).unwrap_or_default(),
            description: condition
                .as_ref()
                .map(|c| c.description.clone())
                .unwrap_or_default(),
            icon_url: condition
                .map(|c| format!("https://openweathermap.org/img/wn/{}@4x.png", c.icon)),
        }
    }
}

/// Current conditions from OpenWeatherMap, metric units.
pub struct WeatherService {
    http_client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl WeatherService {
    pub fn new(api_key: Option<String>) -> Result<Self, reqwest::Error> {
        Self::with_base_url(api_key, OPENWEATHER_BASE_URL)
    }

    pub fn with_base_url(api_key: Option<String>, base_url: &str) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http_client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn current_weather(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::MissingCity);
        }
        let api_key = self.api_key.as_deref().ok_or(WeatherError::NotConfigured)?;

        let response = self
            .http_client
            .get(format!("{}/data/2.5/weather", self.base_url))
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body: OpenWeatherResponse = response.json().await?;
            Ok(body.into())
        } else if status == reqwest::StatusCode::NOT_FOUND {
            Err(WeatherError::CityNotFound(city.to_string()))
        } else {
            log::error!("Weather lookup for {} failed with {}", city, status);
            Err(WeatherError::Upstream(status.as_u16()))
        }
    }
}
