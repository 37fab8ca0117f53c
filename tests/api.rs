use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use todo_api::{app::build_app, state::AppState};
use tower::ServiceExt;

fn app() -> Router {
    build_app(AppState::fake())
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(b) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn register_and_login(app: &Router, username: &str) -> String {
    let (status, _) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Test User",
            "email": format!("{username}@example.com"),
            "phone": "555-0100",
            "username": username,
            "password": "correctpass",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": username, "password": "correctpass" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_route_answers() {
    let (status, body) = send(&app(), Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Todo API is running");
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let (status, body) = send(&app(), Method::GET, "/api/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Route not found", "success": false }));
}

#[tokio::test]
async fn wrong_method_on_known_path_is_json_404() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/auth/login", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Route not found", "success": false }));

    let token = register_and_login(&app, "alice").await;
    for (method, uri) in [
        (Method::PATCH, "/api/todos"),
        (Method::POST, "/api/users/profile"),
        (Method::GET, "/api/users/change-password"),
    ] {
        let (status, body) = send(&app, method.clone(), uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(body, json!({ "error": "Route not found", "success": false }));

        // without a token the auth check still comes first
        let (status, body) = send(&app, method.clone(), uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
async fn register_returns_profile_without_password() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Alice",
            "email": "alice@example.com",
            "phone": "555-0100",
            "username": "alice",
            "password": "correctpass",
            "profile_picture": "https://img.example/alice.png"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["profile_picture"], "https://img.example/alice.png");
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("password_hash").is_none());
    assert!(!body.to_string().contains("correctpass"));
}

#[tokio::test]
async fn register_validation_and_conflict_are_400() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "username": "alice", "password": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    register_and_login(&app, "alice").await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Other",
            "email": "different@example.com",
            "phone": "1",
            "username": "alice",
            "password": "pw"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username already exists");
}

#[tokio::test]
async fn malformed_json_uses_error_shape() {
    let app = app();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn wrong_password_is_401() {
    let app = app();
    register_and_login(&app, "alice").await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "wrongpass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Invalid credentials", "success": false }));
}

#[tokio::test]
async fn logout_is_a_plain_ack() {
    let (status, body) = send(&app(), Method::POST, "/api/auth/logout", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn protected_routes_need_a_valid_bearer_token() {
    let app = app();
    for (method, uri) in [
        (Method::GET, "/api/todos"),
        (Method::GET, "/api/users/profile"),
        (Method::DELETE, "/api/todos/00000000-0000-0000-0000-000000000000"),
    ] {
        let (status, body) = send(&app, method.clone(), uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body["success"], false);

        let (status, _) = send(&app, method, uri, Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let req = Request::builder()
        .uri("/api/todos")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn todo_lifecycle_with_ownership_hiding() {
    let app = app();
    let alice = register_and_login(&app, "alice").await;
    let bob = register_and_login(&app, "bob").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/todos",
        Some(&alice),
        Some(json!({ "title": "no deadline" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/todos",
        Some(&alice),
        Some(json!({ "title": "ship it", "deadline": "2030-06-01T12:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Todo created successfully");
    assert_eq!(body["todo"]["priority"], 5);
    assert_eq!(body["todo"]["is_completed"], false);
    let id = body["todo"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/todos/{id}");

    // bob cannot see, change or remove alice's todo
    let (status, body) = send(&app, Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Todo not found");
    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&bob),
        Some(json!({ "is_completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, list) = send(&app, Method::GET, "/api/todos", Some(&bob), None).await;
    assert_eq!(list, json!([]));

    // alice can
    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&alice),
        Some(json!({ "is_completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = send(&app, Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "ship it");
    assert_eq!(body["is_completed"], true);

    let (_, list) = send(&app, Method::GET, "/api/todos", Some(&alice), None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_statistics_and_password_change() {
    let app = app();
    let token = register_and_login(&app, "alice").await;

    let (status, body) = send(&app, Method::GET, "/api/users/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(
        body["statistics"],
        json!({ "totalTodos": 0, "completedTodos": 0, "efficiency": 0.0 })
    );

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/users/profile",
        Some(&token),
        Some(json!({ "name": "Alice Cooper" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/users/change-password",
        Some(&token),
        Some(json!({ "currentPassword": "nope", "newPassword": "fresh-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Current password is incorrect");

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/users/change-password",
        Some(&token),
        Some(json!({ "currentPassword": "correctpass", "newPassword": "fresh-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "fresh-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "correctpass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = send(&app, Method::GET, "/api/users/profile", Some(&token), None).await;
    assert_eq!(body["user"]["name"], "Alice Cooper");
}
