use actix_web::{web, HttpResponse, Responder};
use mongodb::Client;
use serde::Serialize;
use std::collections::BTreeMap;
use std::env;
use std::sync::Arc;

use crate::{config::AppConfig, db::mongo};

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: BTreeMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

impl ServiceStatus {
    fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

pub async fn health_check(
    client: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
) -> impl Responder {
    let mut services = BTreeMap::new();
    services.insert("mongodb".to_string(), check_mongodb(&client).await);
    services.insert(
        "resend".to_string(),
        check_key("Resend", "RESEND_API_KEY", config.resend_api_key.as_deref()),
    );
    services.insert(
        "openweather".to_string(),
        check_key(
            "OpenWeatherMap",
            "OPENWEATHER_API_KEY",
            config.openweather_api_key.as_deref(),
        ),
    );
    services.insert(
        "openrouteservice".to_string(),
        check_key("OpenRouteService", "ORS_API_KEY", config.ors_api_key.as_deref()),
    );

    // Only the database is essential; missing third-party keys disable single features.
    let status = if services.values().all(ServiceStatus::is_ok) {
        "ok"
    } else {
        "degraded"
    };

    HttpResponse::Ok().json(HealthStatus {
        status: status.to_string(),
        services,
        environment: env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn check_mongodb(client: &Client) -> ServiceStatus {
    match mongo::ping(client).await {
        Ok(()) => ServiceStatus {
            status: "ok".to_string(),
            details: Some("Connected successfully to MongoDB".to_string()),
        },
        Err(e) => {
            log::error!("MongoDB health check failed: {}", e);
            ServiceStatus {
                status: "error".to_string(),
                details: Some(format!("Failed to connect: {}", e)),
            }
        }
    }
}

fn check_key(service: &str, variable: &str, key: Option<&str>) -> ServiceStatus {
    match key {
        Some(key) => ServiceStatus {
            status: "ok".to_string(),
            details: Some(format!("{} key configured ({})", service, mask_key(key))),
        },
        None => ServiceStatus {
            status: "error".to_string(),
            details: Some(format!("{} not configured", variable)),
        },
    }
}

pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}***{}", head, tail)
    } else {
        "***".to_string()
    }
}
