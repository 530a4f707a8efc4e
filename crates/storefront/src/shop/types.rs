//! Shop backend payloads.
//!
//! Field names follow the backend's camelCase JSON.

use serde::{Deserialize, Serialize};

use milk_shop_core::{CartItemId, Price, ProductId};

/// One line of the customer's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub product_name: String,
    /// Product image URL.
    #[serde(default)]
    pub image: Option<String>,
    pub quantity: u32,
    /// Line total (unit price times quantity).
    pub total_price: Price,
}

/// The cart as retrieved from the cart service at page load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    #[serde(default)]
    pub cart_items: Vec<CartItem>,
    #[serde(default)]
    pub total_price: Price,
}

impl CartSnapshot {
    /// A cart with no items and a zero total.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Credentials sent to the login endpoint.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Successful login response.
///
/// `Debug` is implemented manually to keep the token out of logs.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"[REDACTED]")
            .field("username", &self.username)
            .field("full_name", &self.full_name)
            .field("phone", &self.phone)
            .finish()
    }
}

/// A product card on the homepage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub price: Price,
    /// Pre-discount price, when the product is on sale.
    #[serde(default)]
    pub original_price: Option<Price>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_snapshot_from_backend_json() {
        let json = r#"{
            "cartItems": [
                {"id": 11, "productName": "Sữa tươi Vinamilk 1L", "image": "https://cdn.milk.vn/1.png", "quantity": 2, "totalPrice": 64000},
                {"id": 12, "productName": "Sữa chua TH", "image": null, "quantity": 4, "totalPrice": 28000.0}
            ],
            "totalPrice": 92000
        }"#;

        let cart: CartSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(cart.cart_items.len(), 2);
        assert_eq!(cart.total_price, Price::from_dong(92_000));

        let first = cart.cart_items.first().unwrap();
        assert_eq!(first.id, CartItemId::new(11));
        assert_eq!(first.product_name, "Sữa tươi Vinamilk 1L");
        assert_eq!(cart.cart_items.get(1).unwrap().image, None);
    }

    #[test]
    fn test_cart_snapshot_missing_fields_default_to_empty() {
        let cart: CartSnapshot = serde_json::from_str("{}").unwrap();
        assert!(cart.cart_items.is_empty());
        assert!(cart.total_price.is_zero());
    }

    #[test]
    fn test_login_response_profile() {
        let response: LoginResponse = serde_json::from_str(
            r#"{"token": "abc", "username": "an@milk.vn", "fullName": "Nguyen An", "phone": "0900000000"}"#,
        )
        .unwrap();
        assert_eq!(response.username, "an@milk.vn");
        assert_eq!(response.full_name, "Nguyen An");
    }

    #[test]
    fn test_login_response_debug_redacts_token() {
        let response: LoginResponse =
            serde_json::from_str(r#"{"token": "super-secret-token", "username": "an"}"#).unwrap();
        let debug = format!("{response:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret-token"));
        assert!(response.email().is_none());
    }
}
