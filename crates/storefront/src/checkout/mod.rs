//! Checkout: shipping details, validation and the order draft.
//!
//! # Flow
//!
//! ```text
//! GET /checkout          -> new CheckoutForm (contact pre-filled, cart loaded)
//! POST /checkout/field   -> edit_text, one flag recomputed
//! POST /checkout/{level} -> select_province / select_district / select_ward
//! POST /checkout         -> submit: all flags recomputed, OrderDraft or 422
//! ```
//!
//! Nothing here performs I/O; the route handlers fetch cart and geography
//! data and feed it in.

mod address;
mod form;
mod order;
mod store;
mod validation;

pub use address::{AddressSelection, SelectionError, SelectionTicket, find_option};
pub use form::{CheckoutForm, Contact, FormError};
pub use order::OrderDraft;
pub use store::{CheckoutId, CheckoutStore, SharedForm};
pub use validation::{Field, FieldErrors, is_blank};
