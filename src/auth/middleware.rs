use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::extractors::AuthenticatedUser;
use crate::auth::token::TokenService;
use crate::error::AppError;

/// Resolves an `Authorization` header value into an identity.
///
/// Missing header, missing `Bearer ` prefix, an empty token or a token the
/// `TokenService` rejects all give `AppError::Unauthenticated`.
pub fn authenticate(
    authorization: Option<&str>,
    tokens: &TokenService,
) -> Result<AuthenticatedUser, AppError> {
    let value =
        authorization.ok_or_else(|| AppError::Unauthenticated("Missing token".into()))?;
    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthenticated("Bearer token required".into()))?;

    tokens
        .validate(token)
        .map(AuthenticatedUser::from)
        .map_err(|_| AppError::Unauthenticated("Invalid token".into()))
}

/// Requires the admin role. Must run after [`authenticate`].
pub fn require_admin(user: &AuthenticatedUser) -> Result<(), AppError> {
    if user.role.is_admin() {
        Ok(())
    } else {
        log::warn!("user {} denied admin-only operation", user.username);
        Err(AppError::Forbidden("admin access required".into()))
    }
}

/// Authentication gate for a scope.
///
/// Validates the bearer token with the app's `web::Data<TokenService>` and attaches
/// the resulting [`AuthenticatedUser`] to the request extensions.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
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
        let outcome = match req.app_data::<web::Data<TokenService>>() {
            Some(tokens) => {
                let authorization = req
                    .headers()
                    .get(header::AUTHORIZATION)
                    .and_then(|value| value.to_str().ok());
                authenticate(authorization, tokens)
            }
            None => Err(AppError::Unconfigured(
                "TokenService is not registered as app data".into(),
            )),
        };

        match outcome {
            Ok(user) => {
                req.extensions_mut().insert(user);
                Box::pin(self.service.call(req))
            }
            Err(app_err) => {
                log::debug!("rejected request to {}: {}", req.path(), app_err);
                Box::pin(async move { Err(app_err.into()) })
            }
        }
    }
}
