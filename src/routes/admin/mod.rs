use actix_web::web;

use crate::middleware::auth::AuthMiddleware;
use crate::middleware::role_auth::RequireRole;
use crate::models::account::UserRole;

pub mod dashboard;

pub fn config(cfg: &mut web::ServiceConfig, jwt_secret: &str) {
    cfg.service(
        web::scope("/admin")
            .wrap(RequireRole::new(UserRole::Admin))
            .wrap(AuthMiddleware::new(jwt_secret))
            .route("/bookings", web::get().to(dashboard::list_bookings))
            .route("/role-requests", web::get().to(dashboard::list_role_requests))
            .route(
                "/role-requests/{id}",
                web::put().to(dashboard::review_role_request),
            )
            .route("/stats", web::get().to(dashboard::stats)),
    );
}
