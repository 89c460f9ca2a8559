#![allow(dead_code)]

use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::StatusCode,
    test, web, App,
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::sync::Arc;

use lanka_travel_api::{
    config::AppConfig,
    models::catalog::{
        Catalog, Destination, Hotel, HotelCategory, Vehicle, VehicleClass, VehicleType,
    },
    routes,
    services::{
        catalog_service::{CatalogSource, StaticCatalog},
        directions_service::DirectionsService,
        itinerary_synthesis_service::{FixedDailyDistance, TransportCostPolicy},
        notification_service::NotificationService,
        weather_service::WeatherService,
    },
};

pub const TEST_SECRET: &str = "test_jwt_secret";

pub struct TestApp {
    pub client: Arc<mongodb::Client>,
    pub catalog: Arc<dyn CatalogSource>,
    pub config: AppConfig,
}

impl TestApp {
    /// App over the Kandy catalog. The Mongo client connects lazily, so
    /// routes rejected before their first query need no server.
    pub async fn new() -> Self {
        Self::with_catalog(scenario_catalog()).await
    }

    pub async fn with_catalog(catalog: Catalog) -> Self {
        let mongo_uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let client = mongodb::Client::with_uri_str(&mongo_uri)
            .await
            .expect("Failed to create MongoDB client");

        Self {
            client: Arc::new(client),
            catalog: Arc::new(StaticCatalog::new(catalog)),
            config: test_config(),
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let policy: Arc<dyn TransportCostPolicy> =
            Arc::new(FixedDailyDistance(self.config.daily_distance_km));
        let secret = self.config.jwt_secret.clone();

        App::new()
            .app_data(web::Data::new(self.client.clone()))
            .app_data(web::Data::from(self.catalog.clone()))
            .app_data(web::Data::from(policy))
            .app_data(web::Data::new(
                NotificationService::new(&self.config).expect("notification client"),
            ))
            .app_data(web::Data::new(WeatherService::new(None).expect("weather client")))
            .app_data(web::Data::new(DirectionsService::new(None).expect("directions client")))
            .app_data(web::Data::new(self.config.clone()))
            .service(web::scope("/api").configure(move |cfg| routes::config(cfg, &secret)))
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 8080,
        mongodb_uri: "mongodb://localhost:27017".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        resend_api_key: None,
        admin_email: None,
        notification_from: "Sri Lanka Travel <noreply@example.com>".to_string(),
        openweather_api_key: None,
        ors_api_key: None,
        daily_distance_km: 100.0,
    }
}

/// One Luxury hotel in Kandy at 100 a night, one Car at 0.50 per km and a
/// Culture destination in Kandy.
pub fn scenario_catalog() -> Catalog {
    Catalog {
        hotels: vec![
            Hotel {
                id: None,
                user_id: None,
                hotel_name: "Kandy Palace".to_string(),
                stars: 5,
                per_night_charge: 100.0,
                category: HotelCategory::Luxury,
                city: "Kandy".to_string(),
                image_url: None,
                owner_email: None,
                created_at: None,
            },
            Hotel {
                id: None,
                user_id: None,
                hotel_name: "Galle Budget Inn".to_string(),
                stars: 2,
                per_night_charge: 40.0,
                category: HotelCategory::Low,
                city: "Galle".to_string(),
                image_url: None,
                owner_email: None,
                created_at: None,
            },
        ],
        vehicles: vec![Vehicle {
            id: None,
            user_id: None,
            vehicle_type: "Car".to_string(),
            vehicle_class: Some("Mid".to_string()),
            model: "Toyota Axio".to_string(),
            vehicle_number: Some("CAB-1234".to_string()),
            per_km_charge: 0.5,
            image_url: None,
            owner_email: None,
            created_at: None,
        }],
        destinations: vec![Destination {
            id: None,
            category: "Culture".to_string(),
            name: "Temple of the Tooth".to_string(),
            description: "Sacred Buddhist temple".to_string(),
            city: Some("Kandy".to_string()),
        }],
        vehicle_types: vec![
            VehicleType {
                id: None,
                name: "Car".to_string(),
                min_passengers: 1,
                max_passengers: 3,
            },
            VehicleType {
                id: None,
                name: "Van".to_string(),
                min_passengers: 4,
                max_passengers: 9,
            },
        ],
        vehicle_classes: vec![
            VehicleClass {
                id: None,
                vehicle_type: "Car".to_string(),
                class_name: "Mid".to_string(),
                price_multiplier: 1.0,
            },
            VehicleClass {
                id: None,
                vehicle_type: "Car".to_string(),
                class_name: "Luxury".to_string(),
                price_multiplier: 1.5,
            },
        ],
    }
}

/// `Authorization` header value for a token signed with [`TEST_SECRET`].
pub fn bearer(user_id: &str, roles: &[&str]) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = serde_json::json!({
        "sub": user_id,
        "email": format!("{}@example.com", user_id),
        "name": "Test Traveller",
        "app_roles": roles,
        "aud": "authenticated",
        "iat": now,
        "exp": now + 3600,
    });
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("Failed to sign test token");
    format!("Bearer {}", token)
}

/// Status of a request, including rejections raised by middleware.
pub async fn status_of<S, B>(app: &S, req: actix_http::Request) -> StatusCode
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    match test::try_call_service(app, req).await {
        Ok(resp) => resp.status(),
        Err(err) => err.as_response_error().status_code(),
    }
}

pub fn get_test_user_id() -> String {
    "test_user_123".to_string()
}

pub async fn cleanup_test_data(client: &mongodb::Client) {
    let owned = [
        ("Travelers", "SavedItineraries"),
        ("Travelers", "Bookings"),
        ("Account", "Profiles"),
        ("Catalog", "Vehicles"),
    ];
    for (database, collection_name) in owned {
        let collection = client
            .database(database)
            .collection::<mongodb::bson::Document>(collection_name);
        let _ = collection
            .delete_many(mongodb::bson::doc! {
                "user_id": { "$regex": "^test_user_" }
            })
            .await;
    }
}
