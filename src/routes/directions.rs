use actix_web::{http::StatusCode, web, HttpResponse, Responder};

use crate::routes::error_response;
use crate::services::directions_service::{DirectionsError, DirectionsRequest, DirectionsService};

pub fn directions_error_response(err: &DirectionsError) -> HttpResponse {
    match err {
        DirectionsError::LocationNotFound(_) => {
            error_response(StatusCode::NOT_FOUND, err.to_string())
        }
        err if err.is_client_error() => error_response(StatusCode::BAD_REQUEST, err.to_string()),
        err => {
            log::error!("Directions lookup failed: {}", err);
            error_response(StatusCode::BAD_GATEWAY, "Failed to get directions")
        }
    }
}

pub async fn get_directions(
    directions: web::Data<DirectionsService>,
    input: web::Json<DirectionsRequest>,
) -> impl Responder {
    match directions.directions(&input.stops).await {
        Ok(route) => HttpResponse::Ok().json(route),
        Err(err) => directions_error_response(&err),
    }
}
