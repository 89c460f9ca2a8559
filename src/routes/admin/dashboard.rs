use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime, Document},
    options::FindOptions,
    Client, Collection,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::mongo::ACCOUNT_DATABASE;
use crate::models::{
    account::{RequestStatus, RoleGrant, RoleRequest, RoleReviewInput},
    catalog::{Hotel, Vehicle},
};
use crate::routes::{
    booking::bookings_collection, catalog::find_rows, error_response,
    role_request::role_requests_collection,
};
use crate::services::catalog_service::CATALOG_DATABASE;

#[derive(Deserialize)]
pub struct RoleRequestQuery {
    status: Option<RequestStatus>,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub bookings: u64,
    pub hotels: u64,
    pub vehicles: u64,
    pub pending_role_requests: u64,
}

fn newest_first() -> FindOptions {
    let mut options = FindOptions::default();
    options.sort = Some(doc! { "created_at": -1 });
    options
}

pub async fn list_bookings(data: web::Data<Arc<Client>>) -> impl Responder {
    find_rows(bookings_collection(&data), doc! {}, newest_first(), "bookings").await
}

pub async fn list_role_requests(
    data: web::Data<Arc<Client>>,
    params: web::Query<RoleRequestQuery>,
) -> impl Responder {
    let filter = match params.status {
        Some(status) => doc! { "status": status.as_str() },
        None => doc! {},
    };
    find_rows(role_requests_collection(&data), filter, newest_first(), "role requests").await
}

/// Approves or rejects a pending request. Approval also records the grant.
pub async fn review_role_request(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
    input: web::Json<RoleReviewInput>,
) -> impl Responder {
    let action = input.action;
    if action == RequestStatus::Pending {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Action must be approved or rejected",
        );
    }
    let Ok(id) = ObjectId::parse_str(path.as_str()) else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid role request id");
    };

    let requests = role_requests_collection(&data);
    let request = match requests.find_one(doc! { "_id": id }).await {
        Ok(Some(request)) => request,
        Ok(None) => return error_response(StatusCode::NOT_FOUND, "Role request not found"),
        Err(err) => {
            log::error!("Failed to fetch role request {}: {:?}", id, err);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch role request",
            );
        }
    };
    if request.status != RequestStatus::Pending {
        return already_reviewed(request.status);
    }

    // Only one reviewer can move the request out of pending.
    let update = doc! {
        "$set": { "status": action.as_str(), "updated_at": DateTime::now() }
    };
    match requests.update_one(pending_filter(id), update).await {
        Ok(result) if result.matched_count == 0 => {
            return match requests.find_one(doc! { "_id": id }).await {
                Ok(Some(current)) => already_reviewed(current.status),
                _ => error_response(StatusCode::CONFLICT, "Role request already reviewed"),
            };
        }
        Ok(_) => {}
        Err(err) => {
            log::error!("Failed to update role request {}: {:?}", id, err);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to update role request",
            );
        }
    }

    if action == RequestStatus::Approved {
        if let Err(err) = grant_role(&data, &request).await {
            log::error!("Failed to grant role for request {}: {:?}", id, err);
            let reopen = doc! {
                "$set": { "status": RequestStatus::Pending.as_str(), "updated_at": DateTime::now() }
            };
            if let Err(err) = requests.update_one(doc! { "_id": id }, reopen).await {
                log::error!("Failed to reopen role request {}: {:?}", id, err);
            }
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to grant role");
        }
    }

    log::info!(
        "Role request {} for {} {}",
        id,
        request.requested_role,
        action.as_str()
    );
    HttpResponse::Ok().json(RoleRequest {
        status: action,
        updated_at: Some(DateTime::now()),
        ..request
    })
}

fn pending_filter(id: ObjectId) -> Document {
    doc! { "_id": id, "status": RequestStatus::Pending.as_str() }
}

fn already_reviewed(status: RequestStatus) -> HttpResponse {
    error_response(
        StatusCode::CONFLICT,
        format!("Role request already {}", status.as_str()),
    )
}

async fn grant_role(client: &Client, request: &RoleRequest) -> mongodb::error::Result<()> {
    let grants: Collection<RoleGrant> = client.database(ACCOUNT_DATABASE).collection("UserRoles");
    let filter = doc! {
        "user_id": &request.user_id,
        "role": request.requested_role.as_str(),
    };
    let update = doc! {
        "$setOnInsert": {
            "user_id": &request.user_id,
            "role": request.requested_role.as_str(),
            "created_at": DateTime::now(),
        }
    };
    grants.update_one(filter, update).upsert(true).await?;
    Ok(())
}

async fn count<T: Send + Sync>(collection: Collection<T>, filter: Document) -> mongodb::error::Result<u64> {
    collection.count_documents(filter).await
}

pub async fn stats(data: web::Data<Arc<Client>>) -> impl Responder {
    let catalog = data.database(CATALOG_DATABASE);
    let hotels: Collection<Hotel> = catalog.collection("Hotels");
    let vehicles: Collection<Vehicle> = catalog.collection("Vehicles");

    let (bookings, hotels, vehicles, pending) = futures::join!(
        count(bookings_collection(&data), doc! {}),
        count(hotels, doc! {}),
        count(vehicles, doc! {}),
        count(
            role_requests_collection(&data),
            doc! { "status": RequestStatus::Pending.as_str() }
        ),
    );

    match (bookings, hotels, vehicles, pending) {
        (Ok(bookings), Ok(hotels), Ok(vehicles), Ok(pending_role_requests)) => {
            HttpResponse::Ok().json(DashboardStats {
                bookings,
                hotels,
                vehicles,
                pending_role_requests,
            })
        }
        (bookings, hotels, vehicles, pending) => {
            let errors = [bookings.err(), hotels.err(), vehicles.err(), pending.err()];
            for err in errors.iter().flatten() {
                log::error!("Failed to count dashboard stats: {:?}", err);
            }
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load stats")
        }
    }
}
