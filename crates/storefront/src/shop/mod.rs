//! Shop backend API client.
//!
//! The shop backend owns carts, products and customer accounts. The
//! storefront only reads from it:
//!
//! - `POST /api/auth/login` - exchange credentials for a bearer token
//! - `GET /api/carts` - the authenticated customer's cart
//! - `GET /api/products/best-selling` - products for the homepage
//!
//! # Example
//!
//! ```rust,ignore
//! use milk_shop_storefront::shop::ShopApiClient;
//!
//! let client = ShopApiClient::new(&config.upstream)?;
//! let cart = client.get_cart(&customer.bearer()).await?;
//! println!("{} lines, total {}", cart.cart_items.len(), cart.total_price);
//! ```

mod client;
pub mod types;

pub use client::ShopApiClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with the shop backend.
#[derive(Debug, Error)]
pub enum ShopApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The bearer token was rejected.
    #[error("Unauthorized")]
    Unauthorized,

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
