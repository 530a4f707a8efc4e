//! Payment step.
//!
//! Shows the order draft handed over by checkout. Taking the payment itself
//! happens elsewhere; this page is where that hand-off lands.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Redirect, Response};
use tower_sessions::Session;
use tracing::instrument;

use crate::checkout::OrderDraft;
use crate::error::AppError;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::session_keys;

use super::cart::CartView;

/// Payment page template.
#[derive(Template, WebTemplate)]
#[template(path = "payment/show.html")]
pub struct PaymentTemplate {
    pub customer_name: Option<String>,
    pub draft: OrderDraft,
    pub cart: CartView,
}

/// Display the payment step for the pending order draft.
///
/// Without a draft there is nothing to pay for, so the visitor is sent back
/// to checkout.
#[instrument(skip(session, customer))]
pub async fn show(
    session: Session,
    OptionalAuth(customer): OptionalAuth,
) -> Result<Response, AppError> {
    let Some(draft) = session.get::<OrderDraft>(session_keys::ORDER_DRAFT).await? else {
        return Ok(Redirect::to("/checkout").into_response());
    };

    let cart = CartView::from_parts(&draft.cart_items, draft.total_price);

    Ok(PaymentTemplate {
        customer_name: customer.map(|c| c.display_name().to_string()),
        draft,
        cart,
    }
    .into_response())
}
