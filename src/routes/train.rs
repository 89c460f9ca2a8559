use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use serde::Deserialize;

use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::{
    bookings::BookingType,
    train::{Station, StationInfo, TrainBookingInput, TrainBookingResponse, TrainDeparture, TrainSearchResult},
};
use crate::routes::error_response;
use crate::services::{
    notification_service::{BookingNotification, NotificationError, NotificationService},
    train_schedule_service::{self, TrainError},
};

#[derive(Debug, Deserialize)]
pub struct TrainSearchQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

fn train_error_response(err: &TrainError) -> HttpResponse {
    let status = if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::BAD_REQUEST
    };
    error_response(status, err.to_string())
}

pub async fn get_stations() -> impl Responder {
    let stations: Vec<StationInfo> = Station::ALL
        .into_iter()
        .map(|name| StationInfo {
            name,
            description: name.description(),
        })
        .collect();
    HttpResponse::Ok().json(stations)
}

pub async fn search(query: web::Query<TrainSearchQuery>) -> impl Responder {
    let (from, to) = match train_schedule_service::parse_route(query.from.as_deref(), query.to.as_deref()) {
        Ok(route) => route,
        Err(err) => return train_error_response(&err),
    };

    let trains = train_schedule_service::departures(from, to).to_vec();
    log::debug!("Train search {} -> {}: {} service(s)", from, to, trains.len());
    HttpResponse::Ok().json(TrainSearchResult { from, to, trains })
}

/// Notification for a train request. Fares are paid at the station, so the
/// amounts are zero.
pub fn train_notification(
    user: &AuthenticatedUser,
    from: Station,
    to: Station,
    train: &TrainDeparture,
    travel_class: Option<&str>,
    travel_date: Option<chrono::NaiveDate>,
) -> BookingNotification {
    let class = travel_class
        .map(str::to_string)
        .unwrap_or_else(|| train.classes.join(", "));

    let mut details = vec![
        ("Train".to_string(), format!("{} ({})", train.name, train.number)),
        ("From".to_string(), from.to_string()),
        ("To".to_string(), to.to_string()),
        ("Departure".to_string(), train.departs.to_string()),
        ("Arrival".to_string(), train.arrives.to_string()),
        ("Duration".to_string(), train.duration.to_string()),
        ("Class".to_string(), class),
        ("Runs".to_string(), train.days.to_string()),
    ];
    if let Some(date) = travel_date {
        details.push(("Travel Date".to_string(), date.to_string()));
    }

    BookingNotification {
        booking_type: BookingType::Train,
        details,
        customer_name: user.display_name(),
        customer_email: user.email.clone(),
        owner_email: None,
        subtotal: 0.0,
        service_charge: 0.0,
        total_amount: 0.0,
    }
}

pub async fn request_booking(
    notifier: web::Data<NotificationService>,
    input: web::Json<TrainBookingInput>,
    user: AuthenticatedUser,
) -> impl Responder {
    let input = input.into_inner();
    let (from, to) = match train_schedule_service::parse_route(Some(&input.from), Some(&input.to)) {
        Ok(route) => route,
        Err(err) => return train_error_response(&err),
    };
    let train = match train_schedule_service::find_departure(from, to, &input.train_number) {
        Ok(train) => train,
        Err(err) => return train_error_response(&err),
    };
    let travel_class = match train_schedule_service::check_class(train, input.travel_class.as_deref()) {
        Ok(class) => class,
        Err(err) => return train_error_response(&err),
    };

    let notification = train_notification(
        &user,
        from,
        to,
        train,
        travel_class.as_deref(),
        input.travel_date,
    );

    // Nothing is stored for a train request, so a failed e-mail fails it.
    match notifier.send_booking_notification(&notification).await {
        Ok(()) => {
            log::info!(
                "Train request {} {} -> {} sent for {}",
                train.number,
                from,
                to,
                user.user_id
            );
            HttpResponse::Accepted().json(TrainBookingResponse {
                status: "requested",
                from,
                to,
                train: train.clone(),
                travel_class,
                travel_date: input.travel_date,
            })
        }
        Err(NotificationError::NotConfigured(missing)) => {
            log::error!("Train request rejected, {} is not set", missing);
            error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "Train booking is not available right now",
            )
        }
        Err(err) => {
            log::error!("Train booking notification failed: {}", err);
            error_response(StatusCode::BAD_GATEWAY, "Failed to process booking. Please try again.")
        }
    }
}
