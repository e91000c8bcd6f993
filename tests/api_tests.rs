use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use warden::config::{Config, SecretString};

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.general.uploads_path = std::env::temp_dir()
        .join(format!("warden-uploads-{}", uuid::Uuid::new_v4()))
        .to_string_lossy()
        .into_owned();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config.security.jwt_secret = SecretString::new("api-test-secret".to_string());

    let state = warden::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    warden::api::router(state)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn register(app: &Router, username: &str) -> i64 {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users",
            serde_json::json!({
                "full_name": "Alice Liddell",
                "username": username,
                "password": "correctpass",
                "status": "Active",
                "role": "Admin",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    body["data"]["id"].as_i64().unwrap()
}

async fn login(app: &Router, username: &str, password: &str) -> axum::response::Response {
    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({ "username": username, "password": password }),
        ))
        .await
        .unwrap()
}

async fn token_for(app: &Router, username: &str) -> String {
    let response = login(app, username, "correctpass").await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]["token"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_register_and_login() {
    let app = spawn_app().await;
    let id = register(&app, "alice").await;
    assert!(id > 0);

    let token = token_for(&app, "alice").await;
    assert!(!token.is_empty());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/users/{id}"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["role"], "Admin");
    assert!(body["data"].get("password_hash").is_none());
    assert!(!body.to_string().contains("argon2"));
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = spawn_app().await;
    let id = register(&app, "alice").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/users/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/users")
                .header(header::AUTHORIZATION, "Bearer not.a.token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = spawn_app().await;
    register(&app, "alice").await;

    let wrong_password = login(&app, "alice", "wrongpass").await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let wrong_password = body_json(wrong_password).await;

    let unknown_user = login(&app, "mallory", "correctpass").await;
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    let unknown_user = body_json(unknown_user).await;

    assert_eq!(wrong_password, unknown_user);
    assert_eq!(wrong_password["error"], "invalid credentials");
}

#[tokio::test]
async fn test_registration_validation() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users",
            serde_json::json!({
                "full_name": "Bob",
                "username": "bob123",
                "password": "correctpass",
                "status": "Active",
                "role": "Admin",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "username must contain only characters");

    register(&app, "alice").await;
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users",
            serde_json::json!({
                "full_name": "Other Alice",
                "username": "alice",
                "password": "correctpass",
                "status": "Active",
                "role": "Operator",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "username is already taken");
}

#[tokio::test]
async fn test_update_list_and_delete() {
    let app = spawn_app().await;
    let id = register(&app, "alice").await;
    let token = token_for(&app, "alice").await;
    let bearer = format!("Bearer {token}");

    let mut request = json_request(
        "PUT",
        &format!("/api/users/{id}"),
        serde_json::json!({ "full_name": "Alice Pleasance", "status": "Inactive" }),
    );
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, bearer.parse().unwrap());
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["full_name"], "Alice Pleasance");
    assert_eq!(body["data"]["status"], "Inactive");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/users")
                .header(header::AUTHORIZATION, &bearer)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let delete = || {
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/users/{id}"))
            .header(header::AUTHORIZATION, &bearer)
            .body(Body::empty())
            .unwrap()
    };
    let response = app.clone().oneshot(delete()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(delete()).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profile_picture_upload() {
    let app = spawn_app().await;
    let id = register(&app, "alice").await;
    let token = token_for(&app, "alice").await;
    let bearer = format!("Bearer {token}");

    let upload = |filename: &str, bytes: &[u8]| {
        let boundary = "warden-test-boundary";
        let mut body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(format!("/api/users/{id}/profile-picture"))
            .header(header::AUTHORIZATION, &bearer)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    };

    let response = app.clone().oneshot(upload("notes.txt", b"hello")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "invalid file format, only images are allowed");

    let response = app
        .clone()
        .oneshot(upload("avatar.png", b"\x89PNG\r\n"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["profile_picture"], format!("{id}-avatar.png"));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/users/{id}/profile-picture"))
                .header(header::AUTHORIZATION, &bearer)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"\x89PNG\r\n");
}

#[tokio::test]
async fn test_health() {
    let app = spawn_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["database"], true);
    assert_eq!(body["data"]["cache_backend"], "memory");
}
