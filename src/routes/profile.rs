use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use mongodb::{bson::doc, Client, Collection};
use std::sync::Arc;

use crate::db::mongo::ACCOUNT_DATABASE;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::profile::{profile_upsert, Profile, ProfileInput};
use crate::routes::error_response;

fn profiles_collection(client: &Client) -> Collection<Profile> {
    client.database(ACCOUNT_DATABASE).collection("Profiles")
}

pub async fn get_profile(data: web::Data<Arc<Client>>, user: AuthenticatedUser) -> impl Responder {
    match profiles_collection(&data)
        .find_one(doc! { "user_id": &user.user_id })
        .await
    {
        Ok(Some(profile)) => HttpResponse::Ok().json(profile),
        Ok(None) => HttpResponse::Ok().json(Profile::placeholder(&user.user_id, user.name.clone())),
        Err(err) => {
            log::error!("Failed to find profile for {}: {:?}", user.user_id, err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load profile")
        }
    }
}

pub async fn update_profile(
    data: web::Data<Arc<Client>>,
    input: web::Json<ProfileInput>,
    user: AuthenticatedUser,
) -> impl Responder {
    let changes = match input.into_inner().into_changes() {
        Ok(changes) => changes,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let collection = profiles_collection(&data);
    let filter = doc! { "user_id": &user.user_id };
    if let Err(err) = collection
        .update_one(filter.clone(), profile_upsert(&user.user_id, changes))
        .upsert(true)
        .await
    {
        log::error!("Failed to update profile for {}: {:?}", user.user_id, err);
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update profile");
    }
    log::info!("Profile updated for {}", user.user_id);

    match collection.find_one(filter).await {
        Ok(Some(profile)) => HttpResponse::Ok().json(profile),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Profile not found"),
        Err(err) => {
            log::error!("Failed to read profile for {}: {:?}", user.user_id, err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load profile")
        }
    }
}
