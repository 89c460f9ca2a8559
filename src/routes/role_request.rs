use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::{bson::doc, Client, Collection};
use std::sync::Arc;

use crate::db::mongo::ACCOUNT_DATABASE;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::account::{RequestStatus, RoleRequest, RoleRequestInput};
use crate::routes::error_response;

pub fn role_requests_collection(client: &Client) -> Collection<RoleRequest> {
    client.database(ACCOUNT_DATABASE).collection("RoleRequests")
}

pub async fn create(
    data: web::Data<Arc<Client>>,
    input: web::Json<RoleRequestInput>,
    user: AuthenticatedUser,
) -> impl Responder {
    let role = input.requested_role;
    if !role.is_requestable() {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("The {} role cannot be requested", role),
        );
    }
    if user.roles.contains(&role) {
        return error_response(StatusCode::CONFLICT, format!("You already have the {} role", role));
    }

    let collection = role_requests_collection(&data);
    let pending = doc! {
        "user_id": &user.user_id,
        "requested_role": role.as_str(),
        "status": RequestStatus::Pending.as_str(),
    };

    match collection.find_one(pending).await {
        Ok(Some(_)) => {
            return error_response(
                StatusCode::CONFLICT,
                format!("A {} request is already pending", role),
            )
        }
        Ok(None) => {}
        Err(err) => {
            log::error!("Failed to check role requests: {:?}", err);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to submit role request",
            );
        }
    }

    let mut request = RoleRequest::new(user.user_id, user.email, role);
    match collection.insert_one(&request).await {
        Ok(inserted) => {
            request.id = inserted.inserted_id.as_object_id();
            log::info!("Role request for {} submitted by {}", role, request.user_id);
            HttpResponse::Created().json(request)
        }
        Err(err) => {
            log::error!("Failed to insert role request: {:?}", err);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to submit role request",
            )
        }
    }
}

pub async fn list_own(data: web::Data<Arc<Client>>, user: AuthenticatedUser) -> impl Responder {
    let result = role_requests_collection(&data)
        .find(doc! { "user_id": &user.user_id })
        .sort(doc! { "created_at": -1 })
        .await;

    match result {
        Ok(cursor) => match cursor.try_collect::<Vec<RoleRequest>>().await {
            Ok(requests) => HttpResponse::Ok().json(requests),
            Err(err) => {
                log::error!("Failed to collect role requests: {:?}", err);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to collect role requests",
                )
            }
        },
        Err(err) => {
            log::error!("Failed to find role requests: {:?}", err);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to find role requests",
            )
        }
    }
}
