use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::middleware::require_admin;
use crate::auth::token::Claims;
use crate::error::AppError;
use crate::models::Role;

/// The identity attached to a request by `AuthMiddleware`.
///
/// Used as an extractor on routes behind the middleware. If nothing was attached
/// (the middleware did not run) extraction fails with `AppError::Unauthenticated`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: String,
    pub username: String,
    pub role: Role,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.usr,
            role: claims.role,
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>().cloned() {
            Some(user) => ready(Ok(user)),
            None => {
                let err = AppError::Unauthenticated(
                    "no authenticated identity on request".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}

/// An authenticated identity holding the admin role.
///
/// Extraction runs the authorization check after the authentication output is
/// available: no identity gives `Unauthenticated`, a non-admin gives `Forbidden`.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

impl FromRequest for AdminUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let outcome = match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => require_admin(user).map(|_| AdminUser(user.clone())),
            None => Err(AppError::Unauthenticated(
                "no authenticated identity on request".to_string(),
            )),
        };
        ready(outcome.map_err(ActixError::from))
    }
}
