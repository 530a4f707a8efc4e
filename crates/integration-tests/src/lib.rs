//! Integration tests for Milk Shop.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p milk-shop-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - Checkout form state machine through the public API
//! - `storefront_router` - Full router with every layer, driven by `oneshot`
//! - `checkout_geography` - Address selection through submit and payment
//!   against an in-process province lookup
//!
//! By default upstream services point at a closed local port, so every shop
//! and geography call fails fast and the degraded paths are what get
//! exercised. [`spawn_geography`] starts an in-process province lookup for
//! the flows that need real address lists.

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Request, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing;
use serde_json::{Value, json};
use milk_shop_storefront::config::{StorefrontConfig, UpstreamConfig};
use milk_shop_storefront::state::AppState;

/// Nothing listens here.
pub const UNREACHABLE: &str = "http://127.0.0.1:1";

/// Client address used to key the rate limiter.
pub const CLIENT_IP: &str = "203.0.113.9";

/// Configuration with both upstreams unreachable.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        upstream: UpstreamConfig {
            shop_api_base_url: UNREACHABLE.to_string(),
            geo_api_base_url: UNREACHABLE.to_string(),
            image_origins: vec![UNREACHABLE.to_string()],
            geo_cache_ttl: Duration::from_secs(60),
            request_timeout: Duration::from_secs(2),
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// The storefront router over [`test_config`].
///
/// # Panics
///
/// Panics if the HTTP clients cannot be built.
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_app() -> Router {
    let state = AppState::new(test_config()).expect("state builds");
    milk_shop_storefront::app(state)
}

/// The storefront router with geography lookups sent to `geo_base_url`.
///
/// `geo_cache_ttl` is kept short by callers that need every lookup to reach
/// the server.
///
/// # Panics
///
/// Panics if the HTTP clients cannot be built.
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_app_with_geography(geo_base_url: &str, geo_cache_ttl: Duration) -> Router {
    let mut config = test_config();
    config.upstream.geo_api_base_url = geo_base_url.to_string();
    config.upstream.geo_cache_ttl = geo_cache_ttl;
    let state = AppState::new(config).expect("state builds");
    milk_shop_storefront::app(state)
}

// =============================================================================
// Geography Server
// =============================================================================

/// Ho Chi Minh City.
pub const HCM: u32 = 79;
/// District 1, Ho Chi Minh City.
pub const DISTRICT_1: u32 = 760;
/// Ben Nghe ward, District 1.
pub const BEN_NGHE: u32 = 26740;
/// Hanoi.
pub const HANOI: u32 = 1;
/// Ba Dinh district, Hanoi.
pub const BA_DINH: u32 = 1;
/// Phuc Xa ward, Ba Dinh.
pub const PHUC_XA: u32 = 1;

#[derive(Clone, Copy)]
struct GeographyFixture {
    ward_delay: Duration,
}

async fn provinces() -> Json<Value> {
    Json(json!([
        {"name": "Thành phố Hà Nội", "code": HANOI, "division_type": "thành phố trung ương", "districts": []},
        {"name": "Thành phố Hồ Chí Minh", "code": HCM, "division_type": "thành phố trung ương", "districts": []}
    ]))
}

async fn province(Path(code): Path<u32>) -> Response {
    let districts = match code {
        HANOI => json!([{"name": "Quận Ba Đình", "code": BA_DINH, "province_code": HANOI}]),
        HCM => json!([
            {"name": "Quận 1", "code": DISTRICT_1, "province_code": HCM},
            {"name": "Quận 3", "code": 770, "province_code": HCM}
        ]),
        _ => return StatusCode::NOT_FOUND.into_response(),
    };
    Json(json!({"code": code, "districts": districts})).into_response()
}

async fn district(State(fixture): State<GeographyFixture>, Path(code): Path<u32>) -> Response {
    tokio::time::sleep(fixture.ward_delay).await;
    let wards = match code {
        DISTRICT_1 => json!([
            {"name": "Phường Bến Nghé", "code": BEN_NGHE, "district_code": DISTRICT_1},
            {"name": "Phường Đa Kao", "code": 26734, "district_code": DISTRICT_1}
        ]),
        770 => json!([{"name": "Phường 6", "code": 27139, "district_code": 770}]),
        // Ba Dinh shares code 1 with Hanoi; the path keeps them apart
        BA_DINH => json!([{"name": "Phường Phúc Xá", "code": PHUC_XA, "district_code": BA_DINH}]),
        _ => return StatusCode::NOT_FOUND.into_response(),
    };
    Json(json!({"code": code, "wards": wards})).into_response()
}

/// Serve a small province lookup on an ephemeral port and return its base
/// URL. Ward lists are answered after `ward_delay`.
///
/// # Panics
///
/// Panics if the listener cannot bind.
#[allow(clippy::expect_used)]
pub async fn spawn_geography(ward_delay: Duration) -> String {
    let router = Router::new()
        .route("/api/p/", routing::get(provinces))
        .route("/api/p/{code}", routing::get(province))
        .route("/api/d/{code}", routing::get(district))
        .with_state(GeographyFixture { ward_delay });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind geography server");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    format!("http://{addr}/api")
}

/// `name=value` of the session cookie set by a response, if any.
#[must_use]
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("milk_session="))
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

/// A form POST as the checkout script sends it.
///
/// # Panics
///
/// Panics if the request cannot be built.
#[must_use]
#[allow(clippy::expect_used)]
pub fn form_post(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("x-requested-with", "fetch")
        .header("x-forwarded-for", CLIENT_IP);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

/// A plain GET.
///
/// # Panics
///
/// Panics if the request cannot be built.
#[must_use]
#[allow(clippy::expect_used)]
pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request builds")
}
