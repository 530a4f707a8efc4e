//! Checkout against a live province lookup.
//!
//! The geography service runs in-process on an ephemeral port, so option
//! lists are fetched over HTTP and parsed exactly as in production.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{StatusCode, header};
use axum::response::Response;
use tower::ServiceExt;

use milk_shop_integration_tests::{
    BA_DINH, BEN_NGHE, DISTRICT_1, HANOI, HCM, form_post, get, session_cookie, spawn_geography,
    test_app_with_geography,
};

async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn start_checkout(app: &Router) -> (String, String) {
    let response = app.clone().oneshot(get("/checkout", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(response.headers()).unwrap();
    (cookie, body_text(response).await)
}

async fn choose(app: &Router, cookie: &str, level: &str, code: u32) -> String {
    let response = app
        .clone()
        .oneshot(form_post(
            &format!("/checkout/{level}"),
            &format!("code={code}"),
            Some(cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_text(response).await
}

// =============================================================================
// Happy Path
// =============================================================================

#[tokio::test]
async fn test_select_submit_and_pay() {
    let geo = spawn_geography(Duration::ZERO).await;
    let app = test_app_with_geography(&geo, Duration::from_secs(60));

    let (cookie, page) = start_checkout(&app).await;
    assert!(page.contains("Thành phố Hồ Chí Minh"));
    assert!(!page.contains("Could not load the province list"));

    let fragment = choose(&app, &cookie, "province", HCM).await;
    assert!(fragment.contains("Quận 1"));
    assert!(fragment.contains("Please select a district first"));

    let fragment = choose(&app, &cookie, "district", DISTRICT_1).await;
    assert!(fragment.contains("Phường Bến Nghé"));

    let fragment = choose(&app, &cookie, "ward", BEN_NGHE).await;
    assert!(fragment.contains(&format!("value=\"{BEN_NGHE}\" selected")));

    let response = app
        .clone()
        .oneshot(form_post(
            "/checkout",
            "full_name=Nguyen+A&phone=0900000000&street=12+Le+Loi",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/payment");

    let response = app
        .clone()
        .oneshot(get("/payment", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Nguyen A"));
    assert!(body.contains("0900000000"));
    assert!(body.contains("12 Le Loi, Phường Bến Nghé, Quận 1, Thành phố Hồ Chí Minh"));
    assert!(body.contains("0 ₫"));
}

// =============================================================================
// Rejected Selections
// =============================================================================

#[tokio::test]
async fn test_ward_of_old_district_after_province_change() {
    let geo = spawn_geography(Duration::ZERO).await;
    let app = test_app_with_geography(&geo, Duration::from_secs(60));
    let (cookie, _) = start_checkout(&app).await;

    choose(&app, &cookie, "province", HCM).await;
    choose(&app, &cookie, "district", DISTRICT_1).await;
    let fragment = choose(&app, &cookie, "province", HANOI).await;
    assert!(fragment.contains("Quận Ba Đình"));

    let fragment = choose(&app, &cookie, "ward", BEN_NGHE).await;
    assert!(fragment.contains("Please select a district first"));

    // District and ward stay empty, so submit is still blocked
    let response = app
        .clone()
        .oneshot(form_post(
            "/checkout",
            "full_name=Nguyen+A&phone=0900000000&street=12+Le+Loi",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_text(response).await;
    assert!(body.contains("Please select a district"));
    assert!(body.contains("Please select a ward"));
}

#[tokio::test]
async fn test_ward_from_another_district_is_unknown() {
    let geo = spawn_geography(Duration::ZERO).await;
    let app = test_app_with_geography(&geo, Duration::from_secs(60));
    let (cookie, _) = start_checkout(&app).await;

    choose(&app, &cookie, "province", HANOI).await;
    choose(&app, &cookie, "district", BA_DINH).await;

    let fragment = choose(&app, &cookie, "ward", BEN_NGHE).await;
    assert!(fragment.contains(&format!("Unknown ward code {BEN_NGHE}")));
    assert!(fragment.contains("Phường Phúc Xá"));
}

// =============================================================================
// Stale Lists
// =============================================================================

#[tokio::test]
async fn test_ward_list_for_superseded_district_is_discarded() {
    // Wards answer slowly and nothing stays cached, so a ward choice is
    // still loading its list when the province changes underneath it.
    let geo = spawn_geography(Duration::from_millis(400)).await;
    let app = test_app_with_geography(&geo, Duration::from_millis(1));
    let (cookie, _) = start_checkout(&app).await;

    choose(&app, &cookie, "province", HCM).await;
    choose(&app, &cookie, "district", DISTRICT_1).await;

    let slow_ward = tokio::spawn({
        let app = app.clone();
        let cookie = cookie.clone();
        async move { choose(&app, &cookie, "ward", BEN_NGHE).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    let fragment = choose(&app, &cookie, "province", HANOI).await;
    assert!(fragment.contains("Quận Ba Đình"));

    let fragment = slow_ward.await.unwrap();
    assert!(fragment.contains("The ward list was loaded for an earlier selection"));
    assert!(fragment.contains(&format!("value=\"{HANOI}\" selected")));
    assert!(!fragment.contains(&format!("value=\"{BEN_NGHE}\" selected")));
}
