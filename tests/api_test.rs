use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use skillswap::auth::{Claims, TokenKeys};
use skillswap::auth::password::MIN_BCRYPT_COST;
use skillswap::config::Config;
use skillswap::state::AppState;
use skillswap::{db, routes};
use tempfile::TempDir;
use tower::ServiceExt;

const SECRET: &str = "api-test-secret";

fn setup() -> (Router, AppState, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let pool = db::create_pool(&db_path).expect("Failed to create test database");
    db::run_migrations(&pool).expect("Failed to run migrations");

    let mut config = Config::default();
    config.auth.token_secret = Some(SECRET.into());
    config.auth.bcrypt_cost = MIN_BCRYPT_COST;

    let state = AppState::new(pool, config);
    (routes::app(state.clone()), state, temp_dir)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn signup(app: &Router, name: &str, email: &str) -> (String, String) {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "name": name, "email": email, "password": "Passw0rd1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {}", body);
    (
        body["user"]["id"].as_str().unwrap().to_string(),
        body["token"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _state, _temp) = setup();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn knitting_walkthrough() {
    let (app, _state, _temp) = setup();
    let (ann_id, ann_token) = signup(&app, "Ann", "a@x.com").await;
    let (_bob_id, bob_token) = signup(&app, "Bob", "b@x.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/posts",
        Some(&ann_token),
        Some(json!({ "title": "Knitting", "content": "<p>hi</p>" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["post"]["author"]["id"], ann_id.as_str());
    let post_id = body["post"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/posts/{}/comments", post_id),
        Some(&ann_token),
        Some(json!({ "content": "Bring needles" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["comment"]["author"]["name"], "Ann");
    let comment_id = body["comment"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/comments/{}", comment_id),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/comments/{}", comment_id),
        Some(&ann_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, body) = send(&app, Method::GET, &format!("/posts/{}", post_id), None, None).await;
    assert_eq!(body["post"]["comments"].as_array().unwrap().len(), 0);

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/posts/{}", post_id),
        Some(&ann_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = send(&app, Method::GET, &format!("/posts/{}", post_id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn signup_conflict_and_validation_failures() {
    let (app, _state, _temp) = setup();
    signup(&app, "Ann", "a@x.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "name": "Ann Two", "email": "A@X.COM", "password": "Passw0rd1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "name": "Cy", "email": "not-an-email", "password": "Passw0rd1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn signup_response_never_leaks_the_password() {
    let (app, state, _temp) = setup();
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "name": "Ann", "email": "a@x.com", "password": "Passw0rd1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["user"].get("password_hash").is_none());
    assert!(!body.to_string().contains("Passw0rd1"));

    let conn = state.db.get().unwrap();
    let stored: String = conn
        .query_row(
            "SELECT password_hash FROM users WHERE email = 'a@x.com'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_ne!(stored, "Passw0rd1");
    assert!(stored.starts_with("$2"));
}

#[tokio::test]
async fn signin_round_trip_and_wrong_password() {
    let (app, _state, _temp) = setup();
    let (ann_id, _) = signup(&app, "Ann", "a@x.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/signin",
        None,
        Some(json!({ "email": "a@x.com", "password": "Passw0rd1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], ann_id.as_str());
    assert!(body["user"]["posts"].is_array());
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "a@x.com");

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/signin",
        None,
        Some(json!({ "email": "a@x.com", "password": "Wrong0pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert!(body.get("user").is_none());
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn mutations_require_a_valid_token() {
    let (app, _state, _temp) = setup();
    let (ann_id, _) = signup(&app, "Ann", "a@x.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/posts",
        None,
        Some(json!({ "title": "Knitting", "content": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let forged = TokenKeys::new(b"some-other-secret", 1).issue(&ann_id).unwrap();
    let (status, _) = send(
        &app,
        Method::POST,
        "/posts",
        Some(&forged),
        Some(json!({ "title": "Knitting", "content": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let keys = TokenKeys::new(SECRET.as_bytes(), 1);
    let past = chrono::Utc::now().timestamp() - 7200;
    let expired = keys
        .sign(&Claims {
            id: ann_id.clone(),
            iat: past - 3600,
            exp: past,
        })
        .unwrap();
    let (status, _) = send(&app, Method::GET, "/auth/me", Some(&expired), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn every_mutating_route_rejects_missing_and_forged_tokens() {
    let (app, _state, _temp) = setup();
    let (ann_id, ann_token) = signup(&app, "Ann", "a@x.com").await;

    let (_, body) = send(
        &app,
        Method::POST,
        "/posts",
        Some(&ann_token),
        Some(json!({ "title": "Knitting", "content": "hi" })),
    )
    .await;
    let post_id = body["post"]["id"].as_str().unwrap().to_string();
    let (_, body) = send(
        &app,
        Method::POST,
        &format!("/posts/{}/comments", post_id),
        Some(&ann_token),
        Some(json!({ "content": "mine" })),
    )
    .await;
    let comment_id = body["comment"]["id"].as_str().unwrap().to_string();

    let forged = TokenKeys::new(b"some-other-secret", 1).issue(&ann_id).unwrap();
    let past = chrono::Utc::now().timestamp() - 7200;
    let expired = TokenKeys::new(SECRET.as_bytes(), 1)
        .sign(&Claims {
            id: ann_id.clone(),
            iat: past - 3600,
            exp: past,
        })
        .unwrap();

    let routes = [
        (
            Method::POST,
            "/posts".to_string(),
            Some(json!({ "title": "Other", "content": "hi" })),
        ),
        (Method::DELETE, format!("/posts/{}", post_id), None),
        (
            Method::POST,
            format!("/posts/{}/comments", post_id),
            Some(json!({ "content": "sneaky" })),
        ),
        (Method::DELETE, format!("/comments/{}", comment_id), None),
        (Method::POST, format!("/posts/{}/likes", post_id), None),
        (Method::GET, "/auth/me".to_string(), None),
    ];

    for (method, uri, body) in routes {
        for token in [None, Some(forged.as_str()), Some(expired.as_str()), Some("garbage")] {
            let (status, response) =
                send(&app, method.clone(), &uri, token, body.clone()).await;
            assert_eq!(
                status,
                StatusCode::UNAUTHORIZED,
                "{} {} with token {:?}",
                method,
                uri,
                token
            );
            assert_eq!(response["success"], false);
            assert_eq!(response["message"], "Unauthorized");
        }
    }

    let (status, body) = send(&app, Method::GET, &format!("/posts/{}", post_id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["post"]["comments"].as_array().unwrap().len(), 1);
    assert_eq!(body["post"]["like_count"], 0);
    let (_, body) = send(&app, Method::GET, "/posts", None, None).await;
    assert_eq!(body["posts"].as_array().unwrap().len(), 1);
}

async fn send_raw(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    content_type: Option<&str>,
    body: &str,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(Method::POST).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: Value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| panic!("non-JSON body: {}", String::from_utf8_lossy(&bytes)));
    (status, value)
}

#[tokio::test]
async fn malformed_json_bodies_get_the_failure_envelope() {
    let (app, _state, _temp) = setup();
    let (_, token) = signup(&app, "Ann", "a@x.com").await;
    let (_, body) = send(
        &app,
        Method::POST,
        "/posts",
        Some(&token),
        Some(json!({ "title": "Knitting", "content": "hi" })),
    )
    .await;
    let comments_uri = format!("/posts/{}/comments", body["post"]["id"].as_str().unwrap());

    let endpoints = [
        ("/auth/signup", None, r#"{"name":null,"email":"b@x.com","password":"Passw0rd1"}"#),
        ("/auth/signin", None, r#"{"email":5,"password":"Passw0rd1"}"#),
        ("/posts", Some(token.as_str()), r#"{"title":["x"],"content":"hi"}"#),
        (comments_uri.as_str(), Some(token.as_str()), r#"{"content":false}"#),
    ];

    for (uri, token, wrong_types) in endpoints {
        let syntax = send_raw(&app, uri, token, Some("application/json"), "{not json").await;
        let data = send_raw(&app, uri, token, Some("application/json"), wrong_types).await;
        let no_content_type = send_raw(&app, uri, token, None, "{}").await;

        for (kind, (status, body)) in [
            ("syntax", syntax),
            ("data", data),
            ("content type", no_content_type),
        ] {
            assert_eq!(status, StatusCode::BAD_REQUEST, "{} error on {}", kind, uri);
            assert_eq!(body["success"], false, "{} error on {}", kind, uri);
            assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
        }
    }
}

#[tokio::test]
async fn create_post_with_empty_title_is_a_structured_failure() {
    let (app, _state, _temp) = setup();
    let (_, token) = signup(&app, "Ann", "a@x.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/posts",
        Some(&token),
        Some(json!({ "title": "", "content": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Title is required");
}

#[tokio::test]
async fn non_author_cannot_delete_a_post() {
    let (app, _state, _temp) = setup();
    let (_, ann_token) = signup(&app, "Ann", "a@x.com").await;
    let (_, bob_token) = signup(&app, "Bob", "b@x.com").await;

    let (_, body) = send(
        &app,
        Method::POST,
        "/posts",
        Some(&ann_token),
        Some(json!({ "title": "Knitting", "content": "hi" })),
    )
    .await;
    let post_id = body["post"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/posts/{}", post_id),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, Method::GET, &format!("/posts/{}", post_id), None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn likes_toggle_and_show_in_listing() {
    let (app, _state, _temp) = setup();
    let (_, ann_token) = signup(&app, "Ann", "a@x.com").await;
    let (_, bob_token) = signup(&app, "Bob", "b@x.com").await;

    let (_, body) = send(
        &app,
        Method::POST,
        "/posts",
        Some(&ann_token),
        Some(json!({ "title": "Knitting", "content": "<p>hi</p>", "mediaUrl": "" })),
    )
    .await;
    let post_id = body["post"]["id"].as_str().unwrap().to_string();
    assert!(body["post"]["media_url"].is_null());
    let like_uri = format!("/posts/{}/likes", post_id);

    let (status, body) = send(&app, Method::POST, &like_uri, Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["liked"], true);
    assert_eq!(body["like_count"], 1);

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/posts/{}", post_id),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(body["post"]["liked_by_me"], true);

    let (_, body) = send(&app, Method::GET, "/posts", None, None).await;
    assert_eq!(body["posts"][0]["like_count"], 1);
    assert_eq!(body["posts"][0]["excerpt"], "hi");

    let (_, body) = send(&app, Method::POST, &like_uri, Some(&bob_token), None).await;
    assert_eq!(body["liked"], false);
    assert_eq!(body["like_count"], 0);
}
