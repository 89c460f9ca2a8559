use std::future::{ready, Ready};

use actix_web::{
    dev::Payload, error::ErrorUnauthorized, Error, FromRequest, HttpMessage, HttpRequest,
};

use crate::middleware::auth::Claims;
use crate::models::account::UserRole;

/// The caller behind a verified bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub roles: Vec<UserRole>,
}

impl AuthenticatedUser {
    /// Name for notifications, falling back to the e-mail address.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| "Customer".to_string())
    }
}

impl From<&Claims> for AuthenticatedUser {
    fn from(claims: &Claims) -> Self {
        AuthenticatedUser {
            user_id: claims.sub.clone(),
            email: claims.email.clone(),
            name: claims.name.clone(),
            roles: claims.app_roles.clone(),
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(claims) = req.extensions().get::<Claims>() {
            ready(Ok(AuthenticatedUser::from(claims)))
        } else {
            ready(Err(ErrorUnauthorized("User not authenticated")))
        }
    }
}
