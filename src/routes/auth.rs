use crate::{
    auth::{AdminUser, LoginRequest, LoginResponse, RegisterRequest, TokenService},
    error::AppError,
    usecases::UserUsecases,
};
use actix_web::{post, web, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

/// Register a new user
///
/// Creates a new account. The first account ever created becomes an admin.
///
/// ## Responses:
/// - `201 Created`: `{"data": user}` (no password material).
/// - `409 Conflict`: The username is already taken.
/// - `422 Unprocessable Entity`: Invalid username or empty password.
#[post("/register")]
pub async fn register(
    users: web::Data<UserUsecases>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let user = users
        .register(&register_data.username, &register_data.password)
        .await?;

    Ok(HttpResponse::Created().json(json!({ "data": user })))
}

/// Login user
///
/// Authenticates a user and returns a bearer token valid for 24 hours.
///
/// ## Responses:
/// - `200 OK`: `{"token": "..."}`.
/// - `401 Unauthorized`: Unknown username or wrong password (same response for both).
#[post("/login")]
pub async fn login(
    users: web::Data<UserUsecases>,
    tokens: web::Data<TokenService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let user = users
        .login(&login_data.username, &login_data.password)
        .await?;
    let token = tokens.issue(&user)?;

    Ok(HttpResponse::Ok().json(LoginResponse { token }))
}

/// Promote a user to admin
///
/// Admin only. Must be mounted behind `AuthMiddleware`.
///
/// ## Responses:
/// - `204 No Content`: The user is now an admin.
/// - `403 Forbidden`: The caller is not an admin.
/// - `404 Not Found`: No user has this id.
#[post("/{id}/promote")]
pub async fn promote(
    admin: AdminUser,
    users: web::Data<UserUsecases>,
    user_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = user_id.into_inner();
    users.promote(&id).await?;
    log::info!("{} promoted user {}", admin.0.username, id);

    Ok(HttpResponse::NoContent().finish())
}
