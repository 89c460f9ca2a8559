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
use crate::models::catalog::Vehicle;
use crate::routes::{booking::bookings_collection, catalog::find_rows, error_response};
use crate::services::catalog_service::CATALOG_DATABASE;

#[derive(Debug, Deserialize)]
pub struct VehicleInput {
    pub vehicle_type: String,
    #[serde(default, alias = "vehicle_category")]
    pub vehicle_class: Option<String>,
    pub model: String,
    #[serde(default)]
    pub vehicle_number: Option<String>,
    pub per_km_charge: f64,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl VehicleInput {
    pub fn into_vehicle(self, owner: &AuthenticatedUser) -> Result<Vehicle, &'static str> {
        let vehicle_type = self.vehicle_type.trim().to_string();
        let model = self.model.trim().to_string();
        if vehicle_type.is_empty() || model.is_empty() {
            return Err("Vehicle type and model are required");
        }
        if !self.per_km_charge.is_finite() || self.per_km_charge <= 0.0 {
            return Err("Per km charge must be greater than zero");
        }

        Ok(Vehicle {
            id: None,
            user_id: Some(owner.user_id.clone()),
            vehicle_type,
            vehicle_class: self
                .vehicle_class
                .map(|class| class.trim().to_string())
                .filter(|class| !class.is_empty()),
            model,
            vehicle_number: self.vehicle_number,
            per_km_charge: self.per_km_charge,
            image_url: self.image_url,
            owner_email: owner.email.clone(),
            created_at: Some(DateTime::now()),
        })
    }
}

/// `$set` for an edit. An edit without an image keeps the stored one.
fn vehicle_update(vehicle: &Vehicle) -> Document {
    let mut update_doc = doc! {
        "vehicle_type": &vehicle.vehicle_type,
        "vehicle_class": vehicle.vehicle_class.as_deref(),
        "model": &vehicle.model,
        "vehicle_number": vehicle.vehicle_number.as_deref(),
        "per_km_charge": vehicle.per_km_charge,
        "owner_email": vehicle.owner_email.as_deref(),
        "updated_at": DateTime::now(),
    };
    if let Some(image_url) = &vehicle.image_url {
        update_doc.insert("image_url", image_url);
    }
    doc! { "$set": update_doc }
}

fn vehicles_collection(client: &Client) -> Collection<Vehicle> {
    client.database(CATALOG_DATABASE).collection("Vehicles")
}

pub async fn list_vehicles(data: web::Data<Arc<Client>>, user: AuthenticatedUser) -> impl Responder {
    find_rows(
        vehicles_collection(&data),
        doc! { "user_id": &user.user_id },
        FindOptions::default(),
        "vehicles",
    )
    .await
}

pub async fn add_vehicle(
    data: web::Data<Arc<Client>>,
    input: web::Json<VehicleInput>,
    user: AuthenticatedUser,
) -> impl Responder {
    let mut vehicle = match input.into_inner().into_vehicle(&user) {
        Ok(vehicle) => vehicle,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    match vehicles_collection(&data).insert_one(&vehicle).await {
        Ok(inserted) => {
            vehicle.id = inserted.inserted_id.as_object_id();
            HttpResponse::Created().json(vehicle)
        }
        Err(err) => {
            log::error!("Failed to add vehicle: {:?}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to add vehicle")
        }
    }
}

/// Only the owner's own vehicles can be edited.
pub async fn update_vehicle(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
    input: web::Json<VehicleInput>,
    user: AuthenticatedUser,
) -> impl Responder {
    let Ok(id) = ObjectId::parse_str(path.as_str()) else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid vehicle id");
    };
    let vehicle = match input.into_inner().into_vehicle(&user) {
        Ok(vehicle) => vehicle,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let collection = vehicles_collection(&data);
    let filter = doc! { "_id": id, "user_id": &user.user_id };
    match collection.update_one(filter.clone(), vehicle_update(&vehicle)).await {
        Ok(result) if result.matched_count == 0 => {
            return error_response(StatusCode::NOT_FOUND, "Vehicle not found")
        }
        Ok(_) => log::info!("Vehicle {} updated by {}", id, user.user_id),
        Err(err) => {
            log::error!("Failed to update vehicle {}: {:?}", id, err);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update vehicle");
        }
    }

    match collection.find_one(filter).await {
        Ok(Some(updated)) => HttpResponse::Ok().json(updated),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Vehicle not found"),
        Err(err) => {
            log::error!("Failed to read vehicle {}: {:?}", id, err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read vehicle")
        }
    }
}

/// Only the owner's own vehicles can be removed.
pub async fn delete_vehicle(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
    user: AuthenticatedUser,
) -> impl Responder {
    let Ok(id) = ObjectId::parse_str(path.as_str()) else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid vehicle id");
    };

    match vehicles_collection(&data)
        .delete_one(doc! { "_id": id, "user_id": &user.user_id })
        .await
    {
        Ok(result) if result.deleted_count == 0 => {
            error_response(StatusCode::NOT_FOUND, "Vehicle not found")
        }
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(err) => {
            log::error!("Failed to delete vehicle {}: {:?}", id, err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete vehicle")
        }
    }
}

/// Bookings made against any of the caller's vehicles.
pub async fn list_bookings(data: web::Data<Arc<Client>>, user: AuthenticatedUser) -> impl Responder {
    let ids = match vehicles_collection(&data)
        .find(doc! { "user_id": &user.user_id })
        .await
    {
        Ok(cursor) => match cursor.try_collect::<Vec<Vehicle>>().await {
            Ok(vehicles) => vehicles.into_iter().filter_map(|v| v.id).collect::<Vec<_>>(),
            Err(err) => {
                log::error!("Failed to collect vehicles: {:?}", err);
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to collect vehicles");
            }
        },
        Err(err) => {
            log::error!("Failed to find vehicles: {:?}", err);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to find vehicles");
        }
    };

    let mut options = FindOptions::default();
    options.sort = Some(doc! { "created_at": -1 });
    find_rows(
        bookings_collection(&data),
        doc! { "vehicle_id": { "$in": ids } },
        options,
        "bookings",
    )
    .await
}
