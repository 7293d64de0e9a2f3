mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{bearer, init_app, login, register, send};

#[actix_rt::test]
async fn test_register_login_promote_scenario() {
    let app = init_app().await;

    let alice = register(&app, "alice", "pw1").await;
    assert_eq!(alice["role"], "admin");
    assert_eq!(alice["username"], "alice");
    assert!(alice.get("password_hash").is_none());
    assert!(alice["created_at"].is_string());

    let bob = register(&app, "bob", "pw2").await;
    assert_eq!(bob["role"], "user");

    // Login as bob succeeds
    let bob_token = login(&app, "bob", "pw2").await;
    assert!(!bob_token.is_empty());

    // Wrong password is rejected
    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "username": "bob", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "invalid credentials" }));

    // bob cannot promote their own account
    let bob_id = bob["id"].as_str().unwrap().to_string();
    let promote_uri = format!("/api/users/{}/promote", bob_id);
    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri(&promote_uri)
            .append_header(bearer(&bob_token)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // alice (admin) promotes bob
    let alice_token = login(&app, "alice", "pw1").await;
    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri(&promote_uri)
            .append_header(bearer(&alice_token)),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // A fresh token for bob now carries the admin role
    let bob_token = login(&app, "bob", "pw2").await;
    let tokens = taskgate::auth::TokenService::new(common::TEST_SECRET).unwrap();
    let claims = tokens.validate(&bob_token).unwrap();
    assert_eq!(claims.usr, "bob");
    assert_eq!(claims.sub, bob_id);
    assert_eq!(claims.role, taskgate::models::Role::Admin);
}

#[actix_rt::test]
async fn test_duplicate_registration_conflicts() {
    let app = init_app().await;
    let first = register(&app, "alice", "pw1").await;

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "username": "alice", "password": "other" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "username already exists");

    // Original credentials and role are untouched
    let token = login(&app, "alice", "pw1").await;
    let tokens = taskgate::auth::TokenService::new(common::TEST_SECRET).unwrap();
    let claims = tokens.validate(&token).unwrap();
    assert_eq!(claims.sub, first["id"].as_str().unwrap());
    assert_eq!(claims.role, taskgate::models::Role::Admin);
}

#[actix_rt::test]
async fn test_login_failures_look_identical() {
    let app = init_app().await;
    register(&app, "bob", "pw2").await;

    let wrong_password = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "username": "bob", "password": "nope" })),
    )
    .await;
    let unknown_user = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "username": "nobody", "password": "pw2" })),
    )
    .await;

    assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_user);
}

#[actix_rt::test]
async fn test_invalid_registration_inputs() {
    let app = init_app().await;

    let test_cases = vec![
        // Deserialization errors (missing fields)
        (json!({ "password": "pw" }), StatusCode::BAD_REQUEST),
        (json!({ "username": "carol" }), StatusCode::BAD_REQUEST),
        // Validation errors
        (json!({ "username": "", "password": "pw" }), StatusCode::UNPROCESSABLE_ENTITY),
        (json!({ "username": "carol", "password": "" }), StatusCode::UNPROCESSABLE_ENTITY),
    ];

    for (payload, expected) in test_cases {
        let (status, body) = send(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/register")
                .set_json(&payload),
        )
        .await;
        assert_eq!(status, expected, "payload {} gave {}", payload, body);
    }

    // Nothing was stored, so the next registration is still the first admin
    let dave = register(&app, "dave", "pw").await;
    assert_eq!(dave["role"], "admin");
}

#[actix_rt::test]
async fn test_any_non_empty_username_registers() {
    let app = init_app().await;

    for username in ["alice smith", "josé", "bad name!"] {
        let user = register(&app, username, "pw").await;
        assert_eq!(user["username"], username);
    }

    let token = login(&app, "alice smith", "pw").await;
    assert!(!token.is_empty());
}

#[actix_rt::test]
async fn test_promote_requires_authentication_and_existing_user() {
    let app = init_app().await;
    register(&app, "alice", "pw1").await;
    let admin_token = login(&app, "alice", "pw1").await;

    let (status, _) = send(
        &app,
        test::TestRequest::post().uri("/api/users/whatever/promote"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/users/does-not-exist/promote")
            .append_header(bearer(&admin_token)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "user not found");
}
