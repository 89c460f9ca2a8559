use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";
const ORS_BASE_URL: &str = "https://api.openrouteservice.org";
const USER_AGENT: &str = "lanka-travel-api/0.1";

pub const MIN_STOPS: usize = 2;
pub const MAX_STOPS: usize = 8;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;
/// Used for the straight-line estimate when no routing key is configured.
const ASSUMED_SPEED_KMH: f64 = 40.0;

#[derive(Debug, Error)]
pub enum DirectionsError {
    #[error("Minimum 2 stops required")]
    TooFewStops,

    #[error("Maximum 8 stops allowed")]
    TooManyStops,

    #[error("Invalid coordinates for stop {0}")]
    InvalidCoordinates(usize),

    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Routing provider returned {0}")]
    Upstream(u16),

    #[error("Routing provider returned no route")]
    NoRoute,

    #[error("Failed to reach routing provider: {0}")]
    Http(#[from] reqwest::Error),
}

impl DirectionsError {
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DirectionsError::TooFewStops
                | DirectionsError::TooManyStops
                | DirectionsError::InvalidCoordinates(_)
                | DirectionsError::LocationNotFound(_)
        )
    }
}

/// A stop is either a coordinate pair or a place name to geocode.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StopInput {
    Coordinates {
        lat: f64,
        lon: f64,
        #[serde(default)]
        name: Option<String>,
    },
    Place(String),
}

#[derive(Debug, Deserialize)]
pub struct DirectionsRequest {
    pub stops: Vec<StopInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedStop {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub stops: Vec<ResolvedStop>,
    pub distance_km: f64,
    pub duration_hours: f64,
    /// `[lat, lon]` pairs.
    pub geometry: Vec<[f64; 2]>,
    pub estimated: bool,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

#[derive(Debug, Serialize)]
struct OrsRequest {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct OrsResponse {
    features: Vec<OrsFeature>,
}

#[derive(Debug, Deserialize)]
struct OrsFeature {
    properties: OrsProperties,
    geometry: OrsGeometry,
}

#[derive(Debug, Deserialize)]
struct OrsProperties {
    summary: OrsSummary,
}

#[derive(Debug, Deserialize)]
struct OrsSummary {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct OrsGeometry {
    coordinates: Vec<[f64; 2]>,
}

pub struct DirectionsService {
    http_client: reqwest::Client,
    ors_api_key: Option<String>,
    geocoder_url: String,
    router_url: String,
}

impl DirectionsService {
    pub fn new(ors_api_key: Option<String>) -> Result<Self, reqwest::Error> {
        Self::with_base_urls(ors_api_key, NOMINATIM_BASE_URL, ORS_BASE_URL)
    }

    pub fn with_base_urls(
        ors_api_key: Option<String>,
        geocoder_url: &str,
        router_url: &str,
    ) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http_client,
            ors_api_key,
            geocoder_url: geocoder_url.trim_end_matches('/').to_string(),
            router_url: router_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.ors_api_key.is_some()
    }

    pub async fn directions(&self, stops: &[StopInput]) -> Result<Route, DirectionsError> {
        validate_stop_count(stops.len())?;

        let resolved = try_join_all(
            stops
                .iter()
                .enumerate()
                .map(|(index, stop)| self.resolve(index, stop)),
        )
        .await?;

        match self.ors_api_key.as_deref() {
            Some(api_key) => self.fetch_route(api_key, resolved).await,
            None => {
                log::warn!("ORS_API_KEY not set, returning straight-line estimate");
                Ok(straight_line_route(resolved))
            }
        }
    }

    async fn resolve(&self, index: usize, stop: &StopInput) -> Result<ResolvedStop, DirectionsError> {
        match stop {
            StopInput::Coordinates { lat, lon, name } => {
                if !valid_coordinates(*lat, *lon) {
                    return Err(DirectionsError::InvalidCoordinates(index + 1));
                }
                Ok(ResolvedStop {
                    name: name
                        .clone()
                        .unwrap_or_else(|| format!("Stop {}", index + 1)),
                    lat: *lat,
                    lon: *lon,
                })
            }
            StopInput::Place(query) => self.geocode(query).await,
        }
    }

    /// Looks up a place name, restricted to Sri Lanka.
    pub async fn geocode(&self, query: &str) -> Result<ResolvedStop, DirectionsError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DirectionsError::LocationNotFound(String::new()));
        }

        let response = self
            .http_client
            .get(format!("{}/search", self.geocoder_url))
            .query(&[
                ("q", format!("{}, Sri Lanka", query).as_str()),
                ("format", "json"),
                ("limit", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            log::error!("Geocoding {} failed with {}", query, status);
            return Err(DirectionsError::Upstream(status.as_u16()));
        }

        let places: Vec<NominatimPlace> = response.json().await?;
        let place = places
            .into_iter()
            .next()
            .ok_or_else(|| DirectionsError::LocationNotFound(query.to_string()))?;

        let lat = place.lat.parse::<f64>().ok();
        let lon = place.lon.parse::<f64>().ok();
        match (lat, lon) {
            (Some(lat), Some(lon)) => Ok(ResolvedStop {
                name: short_name(&place.display_name),
                lat,
                lon,
            }),
            _ => Err(DirectionsError::LocationNotFound(query.to_string())),
        }
    }

    async fn fetch_route(
        &self,
        api_key: &str,
        stops: Vec<ResolvedStop>,
    ) -> Result<Route, DirectionsError> {
        // ORS takes [lon, lat]
        let body = OrsRequest {
            coordinates: stops.iter().map(|stop| [stop.lon, stop.lat]).collect(),
        };

        let response = self
            .http_client
            .post(format!("{}/v2/directions/driving-car/geojson", self.router_url))
            .header("Authorization", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            log::error!("Route request failed with {}", status);
            return Err(DirectionsError::Upstream(status.as_u16()));
        }

        let ors: OrsResponse = response.json().await?;
        let feature = ors.features.into_iter().next().ok_or(DirectionsError::NoRoute)?;

        Ok(Route {
            stops,
            distance_km: feature.properties.summary.distance / 1000.0,
            duration_hours: feature.properties.summary.duration / 3600.0,
            geometry: feature
                .geometry
                .coordinates
                .into_iter()
                .map(|[lon, lat]| [lat, lon])
                .collect(),
            estimated: false,
        })
    }
}

pub fn validate_stop_count(count: usize) -> Result<(), DirectionsError> {
    if count < MIN_STOPS {
        Err(DirectionsError::TooFewStops)
    } else if count > MAX_STOPS {
        Err(DirectionsError::TooManyStops)
    } else {
        Ok(())
    }
}

fn valid_coordinates(lat: f64, lon: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

/// `"Kandy, Central Province, Sri Lanka"` -> `"Kandy"`
fn short_name(display_name: &str) -> String {
    display_name
        .split(',')
        .next()
        .unwrap_or(display_name)
        .trim()
        .to_string()
}

/// Calculate straight-line distance between two points using the Haversine formula
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = (from.0.to_radians(), from.1.to_radians());
    let (lat2, lon2) = (to.0.to_radians(), to.1.to_radians());

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

fn straight_line_route(stops: Vec<ResolvedStop>) -> Route {
    let distance_km: f64 = stops
        .windows(2)
        .map(|pair| haversine_km((pair[0].lat, pair[0].lon), (pair[1].lat, pair[1].lon)))
        .sum();

    Route {
        geometry: stops.iter().map(|stop| [stop.lat, stop.lon]).collect(),
        stops,
        distance_km,
        duration_hours: distance_km / ASSUMED_SPEED_KMH,
        estimated: true,
    }
}
