//! Order draft handed from checkout to the payment step.

use serde::{Deserialize, Serialize};

use milk_shop_core::Price;

use crate::shop::{CartItem, CartSnapshot};

use super::address::AddressSelection;
use super::form::Contact;

/// The assembled, unpersisted order payload.
///
/// Serialized with the shop backend's camelCase names so the payment step
/// can forward it unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub full_name: String,
    pub phone: String,
    /// Empty when the customer has no email on file.
    pub email: String,
    /// `street, ward, district, province`
    pub address: String,
    pub cart_items: Vec<CartItem>,
    pub total_price: Price,
}

impl OrderDraft {
    /// Bundle contact, address and cart into a draft.
    ///
    /// A cart that never loaded contributes no items and a zero total.
    #[must_use]
    pub fn assemble(
        contact: &Contact,
        address: &AddressSelection,
        cart: Option<&CartSnapshot>,
    ) -> Self {
        let (cart_items, total_price) = cart.map_or_else(
            || (Vec::new(), Price::ZERO),
            |cart| (cart.cart_items.clone(), cart.total_price),
        );

        Self {
            full_name: contact.full_name.trim().to_string(),
            phone: contact.phone.trim().to_string(),
            email: contact.email.clone().unwrap_or_default(),
            address: address.formatted(),
            cart_items,
            total_price,
        }
    }

    /// Total number of units ordered.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.cart_items.iter().map(|item| item.quantity).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use milk_shop_core::CartItemId;

    use super::*;
    use crate::geography::Division;

    fn address() -> AddressSelection {
        let mut address = AddressSelection::default();
        address.select_province(Division::new(1, "Thành phố Hà Nội"));
        address
            .select_district(Division::new(1, "Quận Ba Đình"))
            .unwrap();
        address
            .select_ward(Division::new(1, "Phường Phúc Xá"))
            .unwrap();
        address.street = "  5 Hoàng Diệu ".to_string();
        address
    }

    fn contact() -> Contact {
        Contact {
            full_name: "Tran Binh ".to_string(),
            email: Some("binh@milk.vn".to_string()),
            phone: " 0912345678".to_string(),
        }
    }

    #[test]
    fn test_assemble_without_cart_is_empty_not_error() {
        let draft = OrderDraft::assemble(&contact(), &address(), None);

        assert!(draft.cart_items.is_empty());
        assert_eq!(draft.total_price, Price::ZERO);
        assert_eq!(draft.item_count(), 0);
    }

    #[test]
    fn test_assemble_with_cart() {
        let cart = CartSnapshot {
            cart_items: vec![CartItem {
                id: CartItemId::new(3),
                product_name: "Sữa bột Dielac".to_string(),
                image: None,
                quantity: 2,
                total_price: Price::from_dong(520_000),
            }],
            total_price: Price::from_dong(520_000),
        };

        let draft = OrderDraft::assemble(&contact(), &address(), Some(&cart));

        assert_eq!(draft.cart_items, cart.cart_items);
        assert_eq!(draft.total_price, Price::from_dong(520_000));
        assert_eq!(draft.item_count(), 2);
    }

    #[test]
    fn test_assemble_contact_and_address() {
        let draft = OrderDraft::assemble(&contact(), &address(), None);

        assert_eq!(draft.full_name, "Tran Binh");
        assert_eq!(draft.phone, "0912345678");
        assert_eq!(draft.email, "binh@milk.vn");
        assert_eq!(
            draft.address,
            "5 Hoàng Diệu, Phường Phúc Xá, Quận Ba Đình, Thành phố Hà Nội"
        );
    }

    #[test]
    fn test_missing_email_is_empty_string() {
        let mut contact = contact();
        contact.email = None;
        let draft = OrderDraft::assemble(&contact, &address(), None);
        assert_eq!(draft.email, "");
    }

    #[test]
    fn test_serializes_camel_case() {
        let draft = OrderDraft::assemble(&contact(), &address(), None);
        let json = serde_json::to_value(&draft).unwrap();

        assert!(json.get("fullName").is_some());
        assert!(json.get("cartItems").is_some());
        assert_eq!(json["totalPrice"], serde_json::json!(0.0));
    }
}
