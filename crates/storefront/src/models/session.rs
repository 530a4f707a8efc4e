//! Session-related types.
//!
//! Types stored in the session for authentication and checkout state.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::checkout::Contact;
use crate::shop::LoginResponse;

/// Session-stored customer identity.
///
/// Holds the shop backend bearer token alongside the profile fields the
/// checkout form is pre-filled with. `Debug` redacts the token.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentCustomer {
    token: String,
    /// Login name at the shop backend. Shown as the read-only checkout email.
    pub username: String,
    pub full_name: String,
    pub phone: String,
}

impl CurrentCustomer {
    /// The bearer token for shop backend calls.
    #[must_use]
    pub fn bearer(&self) -> SecretString {
        SecretString::from(self.token.clone())
    }

    /// Contact details to pre-fill the checkout form with.
    #[must_use]
    pub fn contact(&self) -> Contact {
        Contact {
            full_name: self.full_name.clone(),
            email: Some(self.username.clone()),
            phone: self.phone.clone(),
        }
    }

    /// Name to greet the customer with.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}

impl From<LoginResponse> for CurrentCustomer {
    fn from(login: LoginResponse) -> Self {
        Self {
            token: login.token,
            username: login.username,
            full_name: login.full_name,
            phone: login.phone,
        }
    }
}

impl std::fmt::Debug for CurrentCustomer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentCustomer")
            .field("token", &"[REDACTED]")
            .field("username", &self.username)
            .field("full_name", &self.full_name)
            .field("phone", &self.phone)
            .finish()
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in customer.
    pub const CURRENT_CUSTOMER: &str = "current_customer";

    /// Key for the id of the checkout form in progress.
    pub const CHECKOUT_ID: &str = "checkout_id";

    /// Key for the order draft handed from checkout to payment.
    pub const ORDER_DRAFT: &str = "order_draft";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn customer() -> CurrentCustomer {
        let login: LoginResponse = serde_json::from_str(
            r#"{"token": "tok-123", "username": "an@milk.vn", "fullName": "Nguyen An", "phone": "0900000000"}"#,
        )
        .unwrap();
        CurrentCustomer::from(login)
    }

    #[test]
    fn test_contact_prefill() {
        let contact = customer().contact();
        assert_eq!(contact.full_name, "Nguyen An");
        assert_eq!(contact.phone, "0900000000");
        assert_eq!(contact.email.as_deref(), Some("an@milk.vn"));
    }

    #[test]
    fn test_contact_email_is_username_unchanged() {
        let mut customer = customer();
        customer.username = "nguyenan".to_string();
        assert_eq!(customer.contact().email.as_deref(), Some("nguyenan"));
    }

    #[test]
    fn test_bearer() {
        assert_eq!(customer().bearer().expose_secret(), "tok-123");
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug = format!("{:?}", customer());
        assert!(!debug.contains("tok-123"));
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let mut customer = customer();
        customer.full_name = " ".to_string();
        assert_eq!(customer.display_name(), "an@milk.vn");
    }
}
