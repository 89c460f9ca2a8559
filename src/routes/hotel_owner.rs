use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime, Document},
    options::FindOptions,
    Client, Collection,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::catalog::{Hotel, HotelCategory};
use crate::routes::{booking::bookings_collection, catalog::find_rows, error_response};
use crate::services::catalog_service::CATALOG_DATABASE;

#[derive(Debug, Deserialize)]
pub struct HotelInput {
    pub hotel_name: String,
    pub stars: u8,
    pub per_night_charge: f64,
    pub category: HotelCategory,
    pub city: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl HotelInput {
    pub fn into_hotel(self, owner: &AuthenticatedUser) -> Result<Hotel, &'static str> {
        let hotel_name = self.hotel_name.trim().to_string();
        let city = self.city.trim().to_string();
        if hotel_name.is_empty() || city.is_empty() {
            return Err("Hotel name and city are required");
        }
        if !(1..=5).contains(&self.stars) {
            return Err("Stars must be between 1 and 5");
        }
        if !self.per_night_charge.is_finite() || self.per_night_charge <= 0.0 {
            return Err("Per night charge must be greater than zero");
        }

        Ok(Hotel {
            id: None,
            user_id: Some(owner.user_id.clone()),
            hotel_name,
            stars: self.stars,
            per_night_charge: self.per_night_charge,
            category: self.category,
            city,
            image_url: self.image_url,
            owner_email: owner.email.clone(),
            created_at: Some(DateTime::now()),
        })
    }
}

/// `$set` for an edit. An edit without an image keeps the stored one.
fn hotel_update(hotel: &Hotel) -> Document {
    let mut update_doc = doc! {
        "hotel_name": &hotel.hotel_name,
        "stars": hotel.stars as i32,
        "per_night_charge": hotel.per_night_charge,
        "category": hotel.category.as_str(),
        "city": &hotel.city,
        "owner_email": hotel.owner_email.as_deref(),
        "updated_at": DateTime::now(),
    };
    if let Some(image_url) = &hotel.image_url {
        update_doc.insert("image_url", image_url);
    }
    doc! { "$set": update_doc }
}

fn hotels_collection(client: &Client) -> Collection<Hotel> {
    client.database(CATALOG_DATABASE).collection("Hotels")
}

pub async fn list_hotels(data: web::Data<Arc<Client>>, user: AuthenticatedUser) -> impl Responder {
    find_rows(
        hotels_collection(&data),
        doc! { "user_id": &user.user_id },
        FindOptions::default(),
        "hotels",
    )
    .await
}

pub async fn add_hotel(
    data: web::Data<Arc<Client>>,
    input: web::Json<HotelInput>,
    user: AuthenticatedUser,
) -> impl Responder {
    let mut hotel = match input.into_inner().into_hotel(&user) {
        Ok(hotel) => hotel,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    match hotels_collection(&data).insert_one(&hotel).await {
        Ok(inserted) => {
            hotel.id = inserted.inserted_id.as_object_id();
            HttpResponse::Created().json(hotel)
        }
        Err(err) => {
            log::error!("Failed to add hotel: {:?}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to add hotel")
        }
    }
}

/// Only the owner's own hotels can be edited.
pub async fn update_hotel(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
    input: web::Json<HotelInput>,
    user: AuthenticatedUser,
) -> impl Responder {
    let Ok(id) = ObjectId::parse_str(path.as_str()) else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid hotel id");
    };
    let hotel = match input.into_inner().into_hotel(&user) {
        Ok(hotel) => hotel,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let collection = hotels_collection(&data);
    let filter = doc! { "_id": id, "user_id": &user.user_id };
    match collection.update_one(filter.clone(), hotel_update(&hotel)).await {
        Ok(result) if result.matched_count == 0 => {
            return error_response(StatusCode::NOT_FOUND, "Hotel not found")
        }
        Ok(_) => log::info!("Hotel {} updated by {}", id, user.user_id),
        Err(err) => {
            log::error!("Failed to update hotel {}: {:?}", id, err);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update hotel");
        }
    }

    match collection.find_one(filter).await {
        Ok(Some(updated)) => HttpResponse::Ok().json(updated),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Hotel not found"),
        Err(err) => {
            log::error!("Failed to read hotel {}: {:?}", id, err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read hotel")
        }
    }
}

/// Only the owner's own hotels can be removed.
pub async fn delete_hotel(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
    user: AuthenticatedUser,
) -> impl Responder {
    let Ok(id) = ObjectId::parse_str(path.as_str()) else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid hotel id");
    };

    match hotels_collection(&data)
        .delete_one(doc! { "_id": id, "user_id": &user.user_id })
        .await
    {
        Ok(result) if result.deleted_count == 0 => {
            error_response(StatusCode::NOT_FOUND, "Hotel not found")
        }
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(err) => {
            log::error!("Failed to delete hotel {}: {:?}", id, err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete hotel")
        }
    }
}

/// Bookings made against any of the caller's hotels.
pub async fn list_bookings(data: web::Data<Arc<Client>>, user: AuthenticatedUser) -> impl Responder {
    let ids = match hotels_collection(&data)
        .find(doc! { "user_id": &user.user_id })
        .await
    {
        Ok(cursor) => match cursor.try_collect::<Vec<Hotel>>().await {
            Ok(hotels) => hotels.into_iter().filter_map(|h| h.id).collect::<Vec<_>>(),
            Err(err) => {
                log::error!("Failed to collect hotels: {:?}", err);
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to collect hotels");
            }
        },
        Err(err) => {
            log::error!("Failed to find hotels: {:?}", err);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to find hotels");
        }
    };

    let mut options = FindOptions::default();
    options.sort = Some(doc! { "created_at": -1 });
    find_rows(
        bookings_collection(&data),
        doc! { "hotel_id": { "$in": ids } },
        options,
        "bookings",
    )
    .await
}
