#![allow(dead_code)]

use actix_web::body::{to_bytes, MessageBody};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use std::sync::Arc;

use taskgate::auth::{LoginResponse, PasswordHasher, TokenService};
use taskgate::repository::{InMemoryTaskRepository, InMemoryUserRepository};
use taskgate::routes::{self, health};
use taskgate::usecases::{TaskUsecases, UserUsecases};

pub const TEST_SECRET: &str = "integration-test-secret";

/// Builds the full application over empty in-memory stores.
pub async fn init_app() -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    let tasks = TaskUsecases::new(Arc::new(InMemoryTaskRepository::new()));
    let users = UserUsecases::new(Arc::new(InMemoryUserRepository::new(PasswordHasher::new(4))));
    let tokens = TokenService::new(TEST_SECRET).expect("test secret is non-empty");

    test::init_service(
        App::new()
            .app_data(web::Data::new(tasks))
            .app_data(web::Data::new(users))
            .app_data(web::Data::new(tokens))
            .service(health::health)
            .service(web::scope("/api").configure(routes::config)),
    )
    .await
}

/// Sends a request and returns the status and the parsed body (`Null` if empty).
///
/// Errors raised by middleware are rendered the way the server would render them.
pub async fn send(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    req: test::TestRequest,
) -> (StatusCode, Value) {
    let (status, bytes) = match test::try_call_service(app, req.to_request()).await {
        Ok(resp) => (resp.status(), test::read_body(resp).await),
        Err(err) => {
            let resp = err.error_response();
            let status = resp.status();
            let bytes = to_bytes(resp.into_body())
                .await
                .expect("error body is readable");
            (status, bytes)
        }
    };
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

pub async fn register(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
    password: &str,
) -> Value {
    let (status, body) = send(
        app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register {} failed: {}", username, body);
    body["data"].clone()
}

pub async fn login(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
    password: &str,
) -> String {
    let (status, body) = send(
        app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login {} failed: {}", username, body);
    let response: LoginResponse =
        serde_json::from_value(body).expect("Failed to parse login response JSON");
    response.token
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
