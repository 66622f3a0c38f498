// HTTP tests for the btcchecker router
// Run with: cargo test -p btcchecker-api --test http_test
// The router is driven in-process with tower's oneshot; the price upstream is stubbed.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use btcchecker_api::auth::{AuthState, CookieSessionStore, SessionConfig, SESSION_COOKIE_NAME};
use btcchecker_api::{build_router, AppState, BtcRate, RateProvider};
use btcchecker_core::CredentialStore;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

struct StubRates {
    rate: Option<BtcRate>,
}

#[async_trait]
impl RateProvider for StubRates {
    async fn btc_rate(&self) -> anyhow::Result<BtcRate> {
        match &self.rate {
            Some(rate) => Ok(rate.clone()),
            None => anyhow::bail!("upstream down"),
        }
    }
}

fn sample_rate() -> BtcRate {
    BtcRate {
        base: "BTC".to_string(),
        currency: "UAH".to_string(),
        amount: "2512345.67".to_string(),
    }
}

fn session_config() -> SessionConfig {
    SessionConfig {
        secret: "test-secret".to_string(),
        ..Default::default()
    }
}

fn app_with(db: &Path, rate: Option<BtcRate>) -> Router {
    let store = CredentialStore::open(db).unwrap();
    let auth = AuthState::new(Arc::new(store), CookieSessionStore::new(&session_config()));
    build_router(AppState::new(auth, Arc::new(StubRates { rate })))
}

fn test_app() -> (TempDir, Router) {
    let dir = TempDir::new().unwrap();
    let app = app_with(&dir.path().join("db.csv"), Some(sample_rate()));
    (dir, app)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_with_cookie(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: Response<Body>) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// `name=value` pair of the session cookie set on the response
fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{}=", SESSION_COOKIE_NAME)))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

async fn register(app: &Router, email: &str, password: &str) -> Response<Body> {
    app.clone()
        .oneshot(post_json(
            "/user/create",
            json!({ "email": email, "password": password }),
        ))
        .await
        .unwrap()
}

async fn login(app: &Router, email: &str, password: &str) -> Response<Body> {
    app.clone()
        .oneshot(post_json(
            "/user/login",
            json!({ "email": email, "password": password }),
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_register_returns_created() {
    let (dir, app) = test_app();

    let response = register(&app, "a@b.co", "secret1").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await, json!("Success"));

    let contents = std::fs::read_to_string(dir.path().join("db.csv")).unwrap();
    assert!(contents.starts_with("a@b.co,$2"));
}

#[tokio::test]
async fn test_register_duplicate_rejected() {
    let (_dir, app) = test_app();

    assert_eq!(
        register(&app, "a@b.co", "secret1").await.status(),
        StatusCode::CREATED
    );
    let response = register(&app, "a@b.co", "another1").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "incorrect email or password" })
    );
}

#[tokio::test]
async fn test_register_invalid_credentials() {
    let (_dir, app) = test_app();

    let response = register(&app, "not-an-email", "secret1").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = register(&app, "a@b.co", "12345").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("length"));
}

#[tokio::test]
async fn test_register_malformed_body() {
    let (_dir, app) = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/user/create")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let (_dir, app) = test_app();
    register(&app, "a@b.co", "secret1").await;

    let response = login(&app, "a@b.co", "secret1").await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("btcchecker="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Path=/"));
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let (_dir, app) = test_app();
    register(&app, "a@b.co", "secret1").await;

    let wrong_password = login(&app, "a@b.co", "wrong12").await;
    let unknown_email = login(&app, "nobody@b.co", "secret1").await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&wrong_password).is_none());

    let a = body_json(wrong_password).await;
    let b = body_json(unknown_email).await;
    assert_eq!(a, b);
    assert_eq!(a, json!({ "error": "incorrect email or password" }));
}

#[tokio::test]
async fn test_btc_rate_requires_session() {
    let (_dir, app) = test_app();

    let response = app
        .oneshot(get_with_cookie("/btcRate", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await, json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn test_btc_rate_rejects_tampered_cookie() {
    let (_dir, app) = test_app();

    let response = app
        .oneshot(get_with_cookie("/btcRate", Some("btcchecker=not.a.token")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_btc_rate_with_session() {
    let (_dir, app) = test_app();
    register(&app, "a@b.co", "secret1").await;
    let cookie = session_cookie(&login(&app, "a@b.co", "secret1").await).unwrap();

    let response = app
        .oneshot(get_with_cookie("/btcRate", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "base": "BTC", "currency": "UAH", "amount": "2512345.67" })
    );
}

#[tokio::test]
async fn test_session_for_unknown_account_rejected() {
    let (_dir, app) = test_app();
    register(&app, "a@b.co", "secret1").await;
    let cookie = session_cookie(&login(&app, "a@b.co", "secret1").await).unwrap();

    // Same signing key, different credential file without the account
    let other_dir = TempDir::new().unwrap();
    let other = app_with(&other_dir.path().join("db.csv"), Some(sample_rate()));

    let response = other
        .oneshot(get_with_cookie("/btcRate", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_btc_rate_upstream_failure() {
    let dir = TempDir::new().unwrap();
    let app = app_with(&dir.path().join("db.csv"), None);
    register(&app, "a@b.co", "secret1").await;
    let cookie = session_cookie(&login(&app, "a@b.co", "secret1").await).unwrap();

    let response = app
        .oneshot(get_with_cookie("/btcRate", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "price service unavailable" })
    );
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let (_dir, app) = test_app();
    register(&app, "a@b.co", "secret1").await;
    let cookie = session_cookie(&login(&app, "a@b.co", "secret1").await).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/user/logout")
                .header(header::COOKIE, cookie.as_str())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("btcchecker="));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_request_id_header() {
    let (_dir, app) = test_app();

    let response = app
        .clone()
        .oneshot(get_with_cookie("/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    // A caller-supplied id is kept
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

#[tokio::test]
async fn test_registration_survives_restart() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("db.csv");

    let app = app_with(&db, Some(sample_rate()));
    register(&app, "a@b.co", "secret1").await;
    drop(app);

    let app = app_with(&db, Some(sample_rate()));
    assert_eq!(login(&app, "a@b.co", "secret1").await.status(), StatusCode::OK);
    assert_eq!(
        register(&app, "a@b.co", "secret1").await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
}
