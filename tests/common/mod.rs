//! Shared helpers for driving the app through `tower::ServiceExt::oneshot`
//! with real session cookies.

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use rentarr::Config;
use rentarr::state::AppState;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tower::ServiceExt;

static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

pub async fn spawn_app() -> (Arc<AppState>, Router) {
    let mut config = Config::default();
    config.general.database_url = "sqlite::memory:".to_string();
    // A single pooled connection keeps the in-memory database alive and
    // shared across requests.
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;

    let suffix = format!(
        "rentarr-test-{}-{}",
        std::process::id(),
        TEST_COUNTER.fetch_add(1, Ordering::Relaxed)
    );
    config.uploads.static_path = std::env::temp_dir().join(suffix).display().to_string();

    let state = AppState::new(config).await.expect("failed to create app state");
    let router = rentarr::web::router(state.clone());
    (state, router)
}

/// Bootstrap admin seeded by the initial migration.
pub const ADMIN_EMAIL: &str = "admin@rentarr.local";
pub const ADMIN_PASSWORD: &str = "change-me";

pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_form(
    app: &Router,
    uri: &str,
    body: &str,
    cookie: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, mime::APPLICATION_WWW_FORM_URLENCODED.as_ref());
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

pub const BOUNDARY: &str = "----rentarr-test-boundary";

/// Hand-rolled multipart/form-data body for the property forms.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    if let Some((filename, bytes)) = file {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(
    app: &Router,
    uri: &str,
    body: Vec<u8>,
    cookie: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::from(body)).unwrap())
        .await
        .unwrap()
}

/// Register a user and return the session cookie from the redirect.
pub async fn register(
    app: &Router,
    full_name: &str,
    email: &str,
    password: &str,
    role: &str,
) -> String {
    let body = format!(
        "full_name={full_name}&email={email}&phone=555-0100&password={password}&role={role}"
    );
    let response = post_form(app, "/register", &body, None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    session_cookie(&response).expect("registration should establish a session")
}

/// Log in and return (redirect target, session cookie).
pub async fn login(app: &Router, email: &str, password: &str) -> (String, Option<String>) {
    let body = format!("email={email}&password={password}");
    let response = post_form(app, "/login", &body, None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    (location(&response), session_cookie(&response))
}
