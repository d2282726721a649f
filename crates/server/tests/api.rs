//! Router-level tests with stubbed backing store and identity provider.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use pufff_core::{Email, LockerRecord, UserId};
use pufff_server::db::{LockerStore, StoreError};
use pufff_server::directory::LockerDirectory;
use pufff_server::routes;
use pufff_server::services::auth::{
    AdminGate, AuthError, Identity, IdentityProvider, StaticAllowList,
};
use pufff_server::state::AppState;

struct StubStore {
    rows: Vec<LockerRecord>,
    fail: AtomicBool,
}

#[async_trait]
impl LockerStore for StubStore {
    async fn fetch_all(&self) -> Result<Vec<LockerRecord>, StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("stub failure".to_owned()));
        }
        Ok(self.rows.clone())
    }

    async fn upsert_batch(&self, records: &[LockerRecord]) -> Result<u64, StoreError> {
        Ok(records.len() as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Provider that accepts exactly one token.
struct StubProvider {
    token: &'static str,
    email: &'static str,
}

#[async_trait]
impl IdentityProvider for StubProvider {
    async fn resolve(&self, token: &str) -> Result<Identity, AuthError> {
        if token == self.token {
            Ok(Identity {
                user_id: UserId::random(),
                email: Email::parse(self.email).unwrap(),
            })
        } else {
            Err(AuthError::InvalidSession)
        }
    }
}

fn record(code: &str, lat: f64, lng: f64) -> LockerRecord {
    LockerRecord {
        locker_code: Some(code.to_owned()),
        name: Some(format!("Locker {code}")),
        address: Some("Somewhere 1".to_owned()),
        latitude: Some(lat),
        longitude: Some(lng),
        ..LockerRecord::default()
    }
}

fn app(rows: Vec<LockerRecord>, store_fails: bool, admin_email: &'static str) -> Router {
    let store = Arc::new(StubStore {
        rows,
        fail: AtomicBool::new(store_fails),
    });
    let directory = LockerDirectory::new(store);

    let allow_list: BTreeSet<String> = ["admin@example.com".to_owned()].into_iter().collect();
    let gate = AdminGate::new(
        Arc::new(StubProvider {
            token: "valid-token",
            email: admin_email,
        }),
        vec![Arc::new(StaticAllowList::new(allow_list))],
    );

    routes::router(AppState::from_parts(directory, gate))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_with_bearer(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

// ============================================================================
// Locker query endpoint
// ============================================================================

#[tokio::test]
async fn test_ranked_query_returns_nearest_first() {
    let app = app(
        vec![
            record("FAR", 10.0, 0.0),
            record("NEAR", 0.5, 0.0),
            record("MID", 3.0, 0.0),
        ],
        false,
        "admin@example.com",
    );

    let response = app.oneshot(get("/api/lockers?lat=0&lng=0")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let codes: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["NEAR", "MID", "FAR"]);

    let distances: Vec<f64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["distanceKm"].as_f64().unwrap())
        .collect();
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_all_flag_returns_unranked_directory() {
    let app = app(
        vec![record("A", 1.0, 1.0), record("B", 2.0, 2.0)],
        false,
        "admin@example.com",
    );

    let response = app
        .oneshot(get("/api/lockers?all=true&lat=0&lng=0"))
        .await
        .unwrap();
    let body = body_json(response).await;

    assert_eq!(body.as_array().unwrap().len(), 2);
    assert!(body[0].get("distanceKm").is_none());
}

#[tokio::test]
async fn test_unparseable_coordinates_fall_back_to_full_listing() {
    let app = app(
        vec![record("A", 1.0, 1.0), record("B", 2.0, 2.0)],
        false,
        "admin@example.com",
    );

    let response = app
        .oneshot(get("/api/lockers?lat=abc&lng=21.0"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert!(body[0].get("distanceKm").is_none());
}

#[tokio::test]
async fn test_store_failure_degrades_to_empty_array() {
    let app = app(vec![record("A", 1.0, 1.0)], true, "admin@example.com");

    let response = app.oneshot(get("/api/lockers")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body, serde_json::json!([]));
}

// ============================================================================
// Admin session endpoint
// ============================================================================

#[tokio::test]
async fn test_missing_token_is_unauthorized_with_expiring_cookie() {
    let app = app(vec![], false, "admin@example.com");

    let response = app.oneshot(post("/api/admin/session")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    assert!(cookie.starts_with("pufff_is_admin=false"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_allow_listed_identity_gets_admin_session() {
    let app = app(vec![], false, "admin@example.com");

    let response = app
        .oneshot(post_with_bearer("/api/admin/session", "valid-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    assert!(cookie.starts_with("pufff_is_admin=true"));
    assert!(cookie.contains("Max-Age=2592000"));

    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["isAdmin"], true);
}

#[tokio::test]
async fn test_non_admin_identity_gets_cleared_cookie() {
    let app = app(vec![], false, "guest@example.com");

    let response = app
        .oneshot(post_with_bearer("/api/admin/session", "valid-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    assert!(cookie.starts_with("pufff_is_admin=false"));

    let body = body_json(response).await;
    assert_eq!(body["isAdmin"], false);
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let app = app(vec![], false, "admin@example.com");

    let response = app
        .oneshot(post_with_bearer("/api/admin/session", "wrong-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Administrative refresh
// ============================================================================

#[tokio::test]
async fn test_refresh_requires_admin() {
    let app = app(vec![record("A", 1.0, 1.0)], false, "guest@example.com");

    let response = app
        .clone()
        .oneshot(post("/api/admin/lockers/refresh"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Valid token, but the identity is not allow-listed.
    let response = app
        .oneshot(post_with_bearer("/api/admin/lockers/refresh", "valid-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_reports_count() {
    let app = app(
        vec![record("A", 1.0, 1.0), record("B", 2.0, 2.0)],
        false,
        "admin@example.com",
    );

    let response = app
        .oneshot(post_with_bearer("/api/admin/lockers/refresh", "valid-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn test_refresh_propagates_store_failure() {
    let app = app(vec![], true, "admin@example.com");

    let response = app
        .oneshot(post_with_bearer("/api/admin/lockers/refresh", "valid-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// ============================================================================
// Cookie-gated status page
// ============================================================================

#[tokio::test]
async fn test_status_redirects_without_hint_cookie() {
    let app = app(vec![], false, "admin@example.com");

    let response = app.oneshot(get("/admin/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/login"
    );
}

#[tokio::test]
async fn test_status_renders_with_hint_cookie() {
    let app = app(vec![record("A", 1.0, 1.0)], false, "admin@example.com");

    // Warm the cache first.
    let _ = app.clone().oneshot(get("/api/lockers")).await.unwrap();

    let request = Request::builder()
        .uri("/admin/status")
        .header(header::COOKIE, "pufff_is_admin=true")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["lockers"], 1);
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health() {
    let app = app(vec![], false, "admin@example.com");

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// CORS
// ============================================================================

#[tokio::test]
async fn test_cors_allows_the_configured_frontend_origin() {
    let app = app(vec![], false, "admin@example.com")
        .layer(routes::cors_layer("https://shop.example.com/").unwrap());

    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/lockers")
        .header(header::ORIGIN, "https://shop.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(preflight).await.unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "https://shop.example.com"
    );
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .unwrap(),
        "true"
    );

    // A foreign origin gets no allow-origin header back.
    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/lockers")
        .header(header::ORIGIN, "https://evil.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(preflight).await.unwrap();
    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

#[tokio::test]
async fn test_cors_rejects_unparseable_origin() {
    assert!(routes::cors_layer("not a header value\n").is_err());
}
