use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::{bson::doc, bson::Document, options::FindOptions, Client, Collection};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;

use crate::models::catalog::{Destination, Hotel, HotelCategory, Vehicle};
use crate::routes::error_response;
use crate::services::catalog_service::CATALOG_DATABASE;

#[derive(Deserialize)]
pub struct HotelQuery {
    limit: Option<u16>,
    city: Option<String>,
    category: Option<HotelCategory>,
}

#[derive(Deserialize)]
pub struct VehicleQuery {
    limit: Option<u16>,
    vehicle_type: Option<String>,
}

#[derive(Deserialize)]
pub struct DestinationQuery {
    category: Option<String>,
}

/// Case-insensitive prefix match.
pub fn prefix_filter(field: &str, text: &str) -> Document {
    doc! {
        field: {
            "$regex": format!("^{}", regex::escape(text.trim())),
            "$options": "i"
        }
    }
}

pub fn hotel_filter(query: &HotelQuery) -> Document {
    let mut filter = match query.city.as_deref().map(str::trim) {
        Some(city) if !city.is_empty() => prefix_filter("city", city),
        _ => doc! {},
    };
    if let Some(category) = query.category {
        filter.insert("category", category.as_str());
    }
    filter
}

fn exact_filter(field: &str, value: Option<&str>) -> Document {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => doc! {
            field: {
                "$regex": format!("^{}$", regex::escape(value)),
                "$options": "i"
            }
        },
        _ => doc! {},
    }
}

pub(crate) async fn find_rows<T>(
    collection: Collection<T>,
    filter: Document,
    options: FindOptions,
    what: &str,
) -> HttpResponse
where
    T: DeserializeOwned + Serialize + Unpin + Send + Sync,
{
    match collection.find(filter).with_options(options).await {
        Ok(cursor) => match cursor.try_collect::<Vec<T>>().await {
            Ok(rows) => HttpResponse::Ok().json(rows),
            Err(err) => {
                log::error!("Failed to collect {}: {:?}", what, err);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to collect {}.", what),
                )
            }
        },
        Err(err) => {
            log::error!("Failed to find {}: {:?}", what, err);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to find {}.", what),
            )
        }
    }
}

fn limited(limit: Option<u16>) -> FindOptions {
    let mut options = FindOptions::default();
    if let Some(limit) = limit {
        options.limit = Some(limit.into());
    }
    options
}

pub async fn get_hotels(
    data: web::Data<Arc<Client>>,
    params: web::Query<HotelQuery>,
) -> impl Responder {
    let collection: Collection<Hotel> = data.database(CATALOG_DATABASE).collection("Hotels");

    let mut options = limited(params.limit);
    options.sort = Some(doc! { "stars": -1, "hotel_name": 1 });

    find_rows(collection, hotel_filter(&params), options, "hotels").await
}

pub async fn get_vehicles(
    data: web::Data<Arc<Client>>,
    params: web::Query<VehicleQuery>,
) -> impl Responder {
    let collection: Collection<Vehicle> = data.database(CATALOG_DATABASE).collection("Vehicles");

    let mut options = limited(params.limit);
    options.sort = Some(doc! { "per_km_charge": 1 });

    let filter = exact_filter("vehicle_type", params.vehicle_type.as_deref());
    find_rows(collection, filter, options, "vehicles").await
}

pub async fn get_destinations(
    data: web::Data<Arc<Client>>,
    params: web::Query<DestinationQuery>,
) -> impl Responder {
    let collection: Collection<Destination> =
        data.database(CATALOG_DATABASE).collection("Destinations");

    let filter = exact_filter("category", params.category.as_deref());
    find_rows(collection, filter, FindOptions::default(), "destinations").await
}
