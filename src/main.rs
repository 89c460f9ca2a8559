use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use lanka_travel_api::{
    config::AppConfig,
    db, routes,
    services::{
        catalog_service::{CatalogSource, MongoCatalog},
        directions_service::DirectionsService,
        itinerary_synthesis_service::{FixedDailyDistance, TransportCostPolicy},
        notification_service::NotificationService,
        weather_service::WeatherService,
    },
};

fn startup_error(err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        startup_error(e)
    })?;

    log::info!("Attempting to bind to {}:{}", config.host, config.port);

    let client = db::mongo::create_mongo_client(&config.mongodb_uri)
        .await
        .map_err(|e| {
            log::error!("Failed to create MongoDB client: {}", e);
            startup_error(e)
        })?;

    let catalog: Arc<dyn CatalogSource> = Arc::new(MongoCatalog::new(client.clone()));
    let policy: Arc<dyn TransportCostPolicy> =
        Arc::new(FixedDailyDistance(config.daily_distance_km));

    let notifier = web::Data::new(NotificationService::new(&config).map_err(startup_error)?);
    let weather = web::Data::new(
        WeatherService::new(config.openweather_api_key.clone()).map_err(startup_error)?,
    );
    let directions = web::Data::new(
        DirectionsService::new(config.ors_api_key.clone()).map_err(startup_error)?,
    );

    if !notifier.is_configured() {
        log::warn!("RESEND_API_KEY or ADMIN_EMAIL not set, booking e-mails are disabled");
    }
    if !weather.is_configured() {
        log::warn!("OPENWEATHER_API_KEY not set, weather lookups are disabled");
    }
    if !directions.is_configured() {
        log::warn!("ORS_API_KEY not set, directions fall back to straight-line estimates");
    }

    let host = config.host.clone();
    let port = config.port;
    let jwt_secret = config.jwt_secret.clone();
    let config = web::Data::new(config);

    log::info!("Starting HTTP server...");

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .app_data(web::Data::new(client.clone()))
            .app_data(web::Data::from(catalog.clone()))
            .app_data(web::Data::from(policy.clone()))
            .app_data(notifier.clone())
            .app_data(weather.clone())
            .app_data(directions.clone())
            .app_data(config.clone())
            .route("/health", web::get().to(routes::health::health_check))
            .service(web::scope("/api").configure(|cfg| routes::config(cfg, &jwt_secret)))
    })
    .bind((host, port))?
    .run()
    .await
}
