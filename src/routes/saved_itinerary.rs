use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    Client, Collection,
};
use std::sync::Arc;

use crate::db::mongo::TRAVELERS_DATABASE;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::itinerary::{check_snapshot, SaveItineraryInput, SavedItinerary, SnapshotError};
use crate::routes::{
    error_response,
    planner::{attachment_response, synthesis_error_response, ExportQuery},
};
use crate::services::{export_service::renderer_for, itinerary_synthesis_service::validate};

fn collection(client: &Client) -> Collection<SavedItinerary> {
    client
        .database(TRAVELERS_DATABASE)
        .collection("SavedItineraries")
}

/// Filter for one document owned by the caller.
fn owned_filter(id: &str, user: &AuthenticatedUser) -> Option<Document> {
    let id = ObjectId::parse_str(id).ok()?;
    Some(doc! { "_id": id, "user_id": &user.user_id })
}

async fn find_owned(
    client: &Client,
    id: &str,
    user: &AuthenticatedUser,
) -> Result<SavedItinerary, HttpResponse> {
    let Some(filter) = owned_filter(id, user) else {
        return Err(error_response(StatusCode::BAD_REQUEST, "Invalid itinerary id"));
    };

    match collection(client).find_one(filter).await {
        Ok(Some(itinerary)) => Ok(itinerary),
        Ok(None) => Err(error_response(StatusCode::NOT_FOUND, "Itinerary not found")),
        Err(err) => {
            log::error!("Failed to fetch itinerary {}: {:?}", id, err);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch itinerary",
            ))
        }
    }
}

pub async fn list(data: web::Data<Arc<Client>>, user: AuthenticatedUser) -> impl Responder {
    let result = collection(&data)
        .find(doc! { "user_id": &user.user_id })
        .sort(doc! { "created_at": -1 })
        .await;

    match result {
        Ok(cursor) => match cursor.try_collect::<Vec<SavedItinerary>>().await {
            Ok(itineraries) => HttpResponse::Ok().json(itineraries),
            Err(err) => {
                log::error!("Failed to collect saved itineraries: {:?}", err);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to collect saved itineraries",
                )
            }
        },
        Err(err) => {
            log::error!("Failed to find saved itineraries: {:?}", err);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to find saved itineraries",
            )
        }
    }
}

/// Stores the itinerary the user was shown. The catalog is not consulted.
pub async fn save(
    data: web::Data<Arc<Client>>,
    input: web::Json<SaveItineraryInput>,
    user: AuthenticatedUser,
) -> impl Responder {
    let input = input.into_inner();

    let params = match validate(&input.request) {
        Ok(params) => params,
        Err(err) => return synthesis_error_response(&err),
    };
    let result = match input.itinerary.ok_or(SnapshotError::Missing) {
        Ok(result) => result,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, err.to_string()),
    };
    if let Err(err) = check_snapshot(&params, &result) {
        return error_response(StatusCode::BAD_REQUEST, err.to_string());
    }

    let mut itinerary = SavedItinerary::new(user.user_id, input.title, params, result);

    match collection(&data).insert_one(&itinerary).await {
        Ok(inserted) => {
            itinerary.id = inserted.inserted_id.as_object_id();
            log::info!("Saved itinerary {:?} for {}", itinerary.id, itinerary.user_id);
            HttpResponse::Created().json(itinerary)
        }
        Err(err) => {
            log::error!("Failed to save itinerary: {:?}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save itinerary")
        }
    }
}

pub async fn get_by_id(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
    user: AuthenticatedUser,
) -> impl Responder {
    match find_owned(&data, &path, &user).await {
        Ok(itinerary) => HttpResponse::Ok().json(itinerary),
        Err(response) => response,
    }
}

pub async fn delete(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
    user: AuthenticatedUser,
) -> impl Responder {
    let Some(filter) = owned_filter(&path, &user) else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid itinerary id");
    };

    match collection(&data).delete_one(filter).await {
        Ok(result) if result.deleted_count == 0 => {
            error_response(StatusCode::NOT_FOUND, "Itinerary not found")
        }
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(err) => {
            log::error!("Failed to delete itinerary {}: {:?}", path, err);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to delete itinerary",
            )
        }
    }
}

/// Exports the stored snapshot; the catalog is not consulted again.
pub async fn export(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
    query: web::Query<ExportQuery>,
    user: AuthenticatedUser,
) -> impl Responder {
    match find_owned(&data, &path, &user).await {
        Ok(saved) => {
            let renderer = renderer_for(query.format.as_deref());
            attachment_response(
                &saved.title,
                &saved.trip_parameters(),
                &saved.itinerary,
                renderer.as_ref(),
            )
        }
        Err(response) => response,
    }
}
