//! Full-router tests.
//!
//! Both upstreams are unreachable, so these pin down the degraded behaviour:
//! the pages still render, and failures turn into notices.

#![allow(clippy::unwrap_used)]

use axum::body::{Body, to_bytes};
use axum::http::{StatusCode, header};
use axum::response::Response;
use tower::ServiceExt;

use milk_shop_integration_tests::{form_post, get, session_cookie, test_app};

async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Open the checkout page and return the session cookie it set.
async fn start_checkout(app: &axum::Router) -> (String, String) {
    let response = app.clone().oneshot(get("/checkout", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(response.headers()).unwrap();
    (cookie, body_text(response).await)
}

#[tokio::test]
async fn test_health() {
    let response = test_app().oneshot(get("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.headers()["x-frame-options"], "DENY");
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_home_renders_without_best_sellers() {
    let response = test_app().oneshot(get("/", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Featured brands"));
    assert!(body.contains("Our best sellers will be back shortly"));
}

#[tokio::test]
async fn test_checkout_page_degrades_to_notices() {
    let app = test_app();
    let (_, body) = start_checkout(&app).await;

    assert!(body.contains("Log in to load your cart"));
    assert!(body.contains("Could not load the province list"));
    assert!(body.contains("Please select a province first"));
    assert!(body.contains("id=\"address-fields\""));
}

#[tokio::test]
async fn test_empty_submit_is_unprocessable() {
    let app = test_app();
    let (cookie, _) = start_checkout(&app).await;

    let response = app
        .clone()
        .oneshot(form_post(
            "/checkout",
            "full_name=&phone=&street=",
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_text(response).await;
    assert!(body.contains("Please fill in all required fields"));
    assert!(body.contains("Phone number cannot be empty"));
    assert!(body.contains("Please select a ward"));
}

#[tokio::test]
async fn test_field_endpoint_reports_one_flag() {
    let app = test_app();
    let (cookie, _) = start_checkout(&app).await;

    let response = app
        .clone()
        .oneshot(form_post(
            "/checkout/field",
            "field=phone&value=%20%20",
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["field"], "phone");
    assert_eq!(json["error"], true);
    assert_eq!(json["message"], "Phone number cannot be empty");

    let response = app
        .clone()
        .oneshot(form_post(
            "/checkout/field",
            "field=phone&value=0900000000",
            Some(&cookie),
        ))
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["error"], false);
}

#[tokio::test]
async fn test_field_endpoint_rejects_dropdown_fields() {
    let app = test_app();
    let (cookie, _) = start_checkout(&app).await;

    let response = app
        .clone()
        .oneshot(form_post(
            "/checkout/field",
            "field=ward&value=1",
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_district_before_province_is_a_notice() {
    let app = test_app();
    let (cookie, _) = start_checkout(&app).await;

    let response = app
        .clone()
        .oneshot(form_post(
            "/checkout/district",
            "code=760",
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Please select a province first"));
    assert!(body.starts_with("<div id=\"address-fields\""));
}

#[tokio::test]
async fn test_non_numeric_code_is_a_notice() {
    let app = test_app();
    let (cookie, _) = start_checkout(&app).await;

    let response = app
        .clone()
        .oneshot(form_post(
            "/checkout/province",
            "code=abc",
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response)
        .await
        .contains("Please select a province from the list"));
}

#[tokio::test]
async fn test_payment_without_draft_goes_back_to_checkout() {
    let response = test_app().oneshot(get("/payment", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/checkout");
}

#[tokio::test]
async fn test_cart_requires_login() {
    let response = test_app().oneshot(get("/cart", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/auth/login?next=/cart"
    );
}

#[tokio::test]
async fn test_login_page_renders_error() {
    let response = test_app()
        .oneshot(get("/auth/login?error=credentials&next=/checkout", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Invalid username or password"));
    assert!(body.contains("value=\"/checkout\""));
}

#[tokio::test]
async fn test_login_with_backend_down_redirects_with_error() {
    let response = test_app()
        .oneshot(form_post(
            "/auth/login",
            "username=a&password=b&next=%2Fcheckout",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers()[header::LOCATION].to_str().unwrap();
    assert!(location.starts_with("/auth/login?error=unavailable"));
    assert!(location.contains("next=%2Fcheckout"));
}
