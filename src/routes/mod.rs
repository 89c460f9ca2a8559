use actix_web::{
    error::{InternalError, JsonPayloadError},
    http::StatusCode,
    web, HttpRequest, HttpResponse,
};
use serde::Serialize;

use crate::middleware::{auth::AuthMiddleware, role_auth::RequireRole};
use crate::models::account::UserRole;

pub mod admin;
pub mod booking;
pub mod catalog;
pub mod directions;
pub mod driver;
pub mod health;
pub mod hotel_owner;
pub mod planner;
pub mod profile;
pub mod role_request;
pub mod saved_itinerary;
pub mod train;
pub mod weather;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorBody {
        error: message.into(),
    })
}

/// Body that is not JSON, or does not fit the handler's input, still gets the
/// `{error}` shape.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::debug!("Rejected request body: {}", err);
    let response = error_response(StatusCode::BAD_REQUEST, err.to_string());
    InternalError::from_response(err, response).into()
}

/// Registers everything below `/api`.
///
/// In the gated scopes `RequireRole` is wrapped before `AuthMiddleware`, so
/// the token is verified first.
pub fn config(cfg: &mut web::ServiceConfig, jwt_secret: &str) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .route("/hotels", web::get().to(catalog::get_hotels))
        .route("/vehicles", web::get().to(catalog::get_vehicles))
        .route("/destinations", web::get().to(catalog::get_destinations))
        .route("/weather", web::get().to(weather::get_weather))
        .route("/directions", web::post().to(directions::get_directions))
        .service(
            web::scope("/planner")
                .route("/catalog", web::get().to(planner::get_catalog))
                .route("/options", web::get().to(planner::get_options))
                .route("/generate", web::post().to(planner::generate))
                .route("/export", web::post().to(planner::export)),
        )
        .service(
            web::scope("/trains")
                .route("", web::get().to(train::search))
                .route("/stations", web::get().to(train::get_stations))
                .service(
                    web::scope("/bookings")
                        .wrap(AuthMiddleware::new(jwt_secret))
                        .route("", web::post().to(train::request_booking)),
                ),
        )
        .service(
            web::scope("/profile")
                .wrap(AuthMiddleware::new(jwt_secret))
                .route("", web::get().to(profile::get_profile))
                .route("", web::put().to(profile::update_profile)),
        )
        .service(
            web::scope("/itineraries/saved")
                .wrap(AuthMiddleware::new(jwt_secret))
                .route("", web::get().to(saved_itinerary::list))
                .route("", web::post().to(saved_itinerary::save))
                .route("/{id}", web::get().to(saved_itinerary::get_by_id))
                .route("/{id}", web::delete().to(saved_itinerary::delete))
                .route("/{id}/export", web::get().to(saved_itinerary::export)),
        )
        .service(
            web::scope("/bookings")
                .wrap(AuthMiddleware::new(jwt_secret))
                .route("", web::get().to(booking::list_bookings))
                .route("", web::post().to(booking::create_booking)),
        )
        .service(
            web::scope("/role-requests")
                .wrap(AuthMiddleware::new(jwt_secret))
                .route("", web::get().to(role_request::list_own))
                .route("", web::post().to(role_request::create)),
        )
        .service(
            web::scope("/driver")
                .wrap(RequireRole::new(UserRole::Driver))
                .wrap(AuthMiddleware::new(jwt_secret))
                .route("/vehicles", web::get().to(driver::list_vehicles))
                .route("/vehicles", web::post().to(driver::add_vehicle))
                .route("/vehicles/{id}", web::put().to(driver::update_vehicle))
                .route("/vehicles/{id}", web::delete().to(driver::delete_vehicle))
                .route("/bookings", web::get().to(driver::list_bookings)),
        )
        .service(
            web::scope("/hotel-owner")
                .wrap(RequireRole::new(UserRole::HotelOwner))
                .wrap(AuthMiddleware::new(jwt_secret))
                .route("/hotels", web::get().to(hotel_owner::list_hotels))
                .route("/hotels", web::post().to(hotel_owner::add_hotel))
                .route("/hotels/{id}", web::put().to(hotel_owner::update_hotel))
                .route("/hotels/{id}", web::delete().to(hotel_owner::delete_hotel))
                .route("/bookings", web::get().to(hotel_owner::list_bookings)),
        );

    admin::config(cfg, jwt_secret);
}
