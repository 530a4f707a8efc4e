//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Cart
//! GET  /cart                   - Cart page (requires login)
//!
//! # Checkout
//! GET  /checkout               - Checkout page (starts a new form)
//! POST /checkout               - Submit; 303 to /payment or 422 with flags
//! POST /checkout/field         - Record one text field (JSON)
//! POST /checkout/province      - Select province (address fragment)
//! POST /checkout/district      - Select district (address fragment)
//! POST /checkout/ward          - Select ward (address fragment)
//!
//! # Payment
//! GET  /payment                - Order draft handed over by checkout
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! POST /auth/logout            - Logout action
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod notice;
pub mod payment;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{auth_rate_limiter, checkout_rate_limiter};
use crate::state::AppState;

pub use notice::{Notice, NoticeLevel};

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            post(auth::login)
                .layer(auth_rate_limiter())
                .get(auth::login_page),
        )
        .route("/logout", post(auth::logout))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    let fragments = Router::new()
        .route("/field", post(checkout::field))
        .route("/province", post(checkout::select_province))
        .route("/district", post(checkout::select_district))
        .route("/ward", post(checkout::select_ward))
        .layer(checkout_rate_limiter());

    Router::new()
        .route("/", get(checkout::show).post(checkout::submit))
        .merge(fragments)
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        .route("/health", get(health))
        .route("/cart", get(cart::show))
        .nest("/checkout", checkout_routes())
        .route("/payment", get(payment::show))
        .nest("/auth", auth_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
