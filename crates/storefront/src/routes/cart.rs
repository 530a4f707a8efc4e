//! Cart route handlers.
//!
//! The cart itself is owned by the shop backend; the storefront only reads
//! it with the customer's bearer token.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use milk_shop_core::Price;

use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentCustomer;
use crate::shop::{CartItem, CartSnapshot, ShopApiError};
use crate::state::AppState;

use super::notice::Notice;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_name: String,
    pub image: Option<String>,
    pub quantity: u32,
    pub line_price: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u32,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::from(&CartSnapshot::empty())
    }

    /// Build from loose items and a total, as carried by an order draft.
    #[must_use]
    pub fn from_parts(items: &[CartItem], total: Price) -> Self {
        Self {
            items: items.iter().map(CartItemView::from).collect(),
            total: total.display(),
            item_count: items.iter().map(|item| item.quantity).sum(),
        }
    }
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            product_name: item.product_name.clone(),
            image: item.image.clone(),
            quantity: item.quantity,
            line_price: item.total_price.display(),
        }
    }
}

impl From<&CartSnapshot> for CartView {
    fn from(cart: &CartSnapshot) -> Self {
        Self::from_parts(&cart.cart_items, cart.total_price)
    }
}

/// Fetch the customer's cart, or explain why it is missing.
///
/// Every failure collapses to `None` plus one notice; the caller treats the
/// cart as absent.
pub async fn load_cart(
    state: &AppState,
    customer: Option<&CurrentCustomer>,
) -> (Option<CartSnapshot>, Option<Notice>) {
    let Some(customer) = customer else {
        return (None, Some(Notice::info("Log in to load your cart")));
    };

    match state.shop().get_cart(&customer.bearer()).await {
        Ok(cart) => (Some(cart), None),
        Err(ShopApiError::Unauthorized) => {
            tracing::warn!(username = %customer.username, "Cart request rejected, token expired?");
            (
                None,
                Some(Notice::error("Your session has expired. Please log in again")),
            )
        }
        Err(e) => {
            tracing::error!("Failed to fetch cart: {e}");
            (None, Some(Notice::error("Could not load your cart")))
        }
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub customer_name: Option<String>,
    pub notices: Vec<Notice>,
    pub cart: CartView,
}

/// Display cart page.
#[instrument(skip(state, customer))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
) -> impl IntoResponse {
    let (cart, notice) = load_cart(&state, Some(&customer)).await;

    CartShowTemplate {
        customer_name: Some(customer.display_name().to_string()),
        notices: notice.into_iter().collect(),
        cart: cart.as_ref().map_or_else(CartView::empty, CartView::from),
    }
}
