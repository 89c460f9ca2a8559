use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::{ErrorForbidden, ErrorUnauthorized},
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::middleware::auth::Claims;
use crate::models::account::UserRole;

/// Admits requests whose claims carry the role, or `admin`.
///
/// Must run after [`AuthMiddleware`](crate::middleware::auth::AuthMiddleware),
/// so wrap it first.
pub struct RequireRole {
    required_role: UserRole,
}

impl RequireRole {
    pub fn new(role: UserRole) -> Self {
        RequireRole { required_role: role }
    }
}

pub fn is_permitted(claims: &Claims, required_role: UserRole) -> bool {
    claims.has_role(required_role) || claims.has_role(UserRole::Admin)
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequireRoleService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleService {
            service,
            required_role: self.required_role,
        }))
    }
}

pub struct RequireRoleService<S> {
    service: S,
    required_role: UserRole,
}

impl<S, B> Service<ServiceRequest> for RequireRoleService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let permitted = req
            .extensions()
            .get::<Claims>()
            .map(|claims| is_permitted(claims, self.required_role));

        match permitted {
            Some(true) => Box::pin(self.service.call(req)),
            Some(false) => {
                log::debug!("Access denied, {} role required", self.required_role);
                Box::pin(ready(Err(ErrorForbidden("Insufficient permissions"))))
            }
            None => Box::pin(ready(Err(ErrorUnauthorized("No authorization")))),
        }
    }
}
