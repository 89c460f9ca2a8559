use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::{bson::doc, bson::DateTime, Client, Collection};
use std::sync::Arc;

use crate::db::mongo::TRAVELERS_DATABASE;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::{
    bookings::{Booking, BookingInput, BookingResponse, BookingStatus, BookingType},
    catalog::{Hotel, Vehicle},
};
use crate::routes::error_response;
use crate::services::{
    catalog_service::CATALOG_DATABASE,
    notification_service::{BookingNotification, NotificationService},
    pricing_service::{parse_object_id, BookingError, PricingService},
};

pub const PAYMENT_METHOD: &str = "card";

pub fn bookings_collection(client: &Client) -> Collection<Booking> {
    client.database(TRAVELERS_DATABASE).collection("Bookings")
}

pub fn booking_error_response(err: &BookingError) -> HttpResponse {
    match err {
        BookingError::Database(e) => {
            log::error!("Booking failed: {:?}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create booking")
        }
        err if err.is_not_found() => error_response(StatusCode::NOT_FOUND, err.to_string()),
        err => error_response(StatusCode::BAD_REQUEST, err.to_string()),
    }
}

fn new_booking(user_id: &str, booking_type: BookingType) -> Booking {
    Booking {
        id: None,
        user_id: user_id.to_string(),
        booking_type,
        vehicle_id: None,
        rental_start_date: None,
        rental_end_date: None,
        estimated_km: None,
        hotel_id: None,
        check_in_date: None,
        check_out_date: None,
        number_of_persons: None,
        number_of_nights: None,
        room_type: None,
        subtotal: 0.0,
        service_charge: 0.0,
        total_amount: 0.0,
        payment_method: PAYMENT_METHOD.to_string(),
        booking_status: BookingStatus::Confirmed,
        created_at: Some(DateTime::now()),
    }
}

/// Prices a booking against the listed rate. Returns the booking ready to
/// insert plus the notification describing it.
pub async fn price_booking(
    client: &Client,
    user: &AuthenticatedUser,
    input: BookingInput,
) -> Result<(Booking, BookingNotification), BookingError> {
    let catalog = client.database(CATALOG_DATABASE);

    match input {
        BookingInput::Vehicle {
            vehicle_id,
            rental_start_date,
            rental_end_date,
            estimated_km,
        } => {
            let id = parse_object_id(&vehicle_id, "vehicle")?;
            let vehicles: Collection<Vehicle> = catalog.collection("Vehicles");
            let vehicle = vehicles
                .find_one(doc! { "_id": id })
                .await?
                .ok_or(BookingError::VehicleNotFound)?;

            let quote = PricingService::quote_vehicle(
                estimated_km,
                vehicle.per_km_charge,
                rental_start_date,
                rental_end_date,
            )?;

            let mut booking = new_booking(&user.user_id, BookingType::Vehicle);
            booking.vehicle_id = Some(id);
            booking.rental_start_date = Some(rental_start_date);
            booking.rental_end_date = Some(rental_end_date);
            booking.estimated_km = Some(estimated_km);
            booking.subtotal = quote.subtotal;
            booking.service_charge = quote.service_charge;
            booking.total_amount = quote.total_amount;

            let notification = BookingNotification {
                booking_type: BookingType::Vehicle,
                details: vec![
                    (
                        "Vehicle".to_string(),
                        format!("{} ({})", vehicle.model, vehicle.vehicle_type),
                    ),
                    (
                        "Vehicle Number".to_string(),
                        vehicle.vehicle_number.clone().unwrap_or_else(|| "-".to_string()),
                    ),
                    ("Rental Start".to_string(), rental_start_date.to_string()),
                    ("Rental End".to_string(), rental_end_date.to_string()),
                    ("Estimated Distance".to_string(), format!("{} km", estimated_km)),
                ],
                customer_name: user.display_name(),
                customer_email: user.email.clone(),
                owner_email: vehicle.owner_email.clone(),
                subtotal: quote.subtotal,
                service_charge: quote.service_charge,
                total_amount: quote.total_amount,
            };
            Ok((booking, notification))
        }
        BookingInput::Accommodation {
            hotel_id,
            check_in_date,
            check_out_date,
            number_of_persons,
            room_type,
        } => {
            let id = parse_object_id(&hotel_id, "hotel")?;
            if number_of_persons < 1 {
                return Err(BookingError::InvalidGuests);
            }
            let room_type = room_type.trim().to_string();
            if room_type.is_empty() {
                return Err(BookingError::MissingRoomType);
            }
            let nights = PricingService::calculate_nights(check_in_date, check_out_date)?;

            let hotels: Collection<Hotel> = catalog.collection("Hotels");
            let hotel = hotels
                .find_one(doc! { "_id": id })
                .await?
                .ok_or(BookingError::HotelNotFound)?;

            let quote = PricingService::quote_accommodation(nights, hotel.per_night_charge);

            let mut booking = new_booking(&user.user_id, BookingType::Accommodation);
            booking.hotel_id = Some(id);
            booking.check_in_date = Some(check_in_date);
            booking.check_out_date = Some(check_out_date);
            booking.number_of_persons = Some(number_of_persons);
            booking.number_of_nights = Some(nights);
            booking.room_type = Some(room_type.clone());
            booking.subtotal = quote.subtotal;
            booking.service_charge = quote.service_charge;
            booking.total_amount = quote.total_amount;

            let notification = BookingNotification {
                booking_type: BookingType::Accommodation,
                details: vec![
                    ("Hotel".to_string(), hotel.hotel_name.clone()),
                    ("City".to_string(), hotel.city.clone()),
                    ("Room Type".to_string(), room_type),
                    ("Check-in".to_string(), check_in_date.to_string()),
                    ("Check-out".to_string(), check_out_date.to_string()),
                    ("Nights".to_string(), nights.to_string()),
                    ("Guests".to_string(), number_of_persons.to_string()),
                ],
                customer_name: user.display_name(),
                customer_email: user.email.clone(),
                owner_email: hotel.owner_email.clone(),
                subtotal: quote.subtotal,
                service_charge: quote.service_charge,
                total_amount: quote.total_amount,
            };
            Ok((booking, notification))
        }
    }
}

pub async fn create_booking(
    data: web::Data<Arc<Client>>,
    notifier: web::Data<NotificationService>,
    input: web::Json<BookingInput>,
    user: AuthenticatedUser,
) -> impl Responder {
    let (mut booking, notification) = match price_booking(&data, &user, input.into_inner()).await {
        Ok(priced) => priced,
        Err(err) => return booking_error_response(&err),
    };

    match bookings_collection(&data).insert_one(&booking).await {
        Ok(inserted) => booking.id = inserted.inserted_id.as_object_id(),
        Err(err) => return booking_error_response(&BookingError::Database(err)),
    }

    log::info!(
        "{} booking {:?} created for {}",
        booking.booking_type.as_str(),
        booking.id,
        booking.user_id
    );

    // The booking stands even if the e-mail does not go out.
    let (notification_sent, warning) = match notifier.send_booking_notification(&notification).await {
        Ok(()) => (true, None),
        Err(err) => {
            log::warn!("Booking notification failed: {}", err);
            (
                false,
                Some("Booking confirmed, but the notification e-mail could not be sent".to_string()),
            )
        }
    };

    HttpResponse::Created().json(BookingResponse {
        booking,
        notification_sent,
        warning,
    })
}

pub async fn list_bookings(data: web::Data<Arc<Client>>, user: AuthenticatedUser) -> impl Responder {
    let result = bookings_collection(&data)
        .find(doc! { "user_id": &user.user_id })
        .sort(doc! { "created_at": -1 })
        .await;

    match result {
        Ok(cursor) => match cursor.try_collect::<Vec<Booking>>().await {
            Ok(bookings) => HttpResponse::Ok().json(bookings),
            Err(err) => {
                log::error!("Failed to collect bookings: {:?}", err);
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to collect bookings")
            }
        },
        Err(err) => {
            log::error!("Failed to find bookings: {:?}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to find bookings")
        }
    }
}
