//! Checkout form state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geography::Division;
use crate::shop::CartSnapshot;

use super::address::{AddressSelection, SelectionError, SelectionTicket};
use super::order::OrderDraft;
use super::validation::{Field, FieldErrors, is_blank};

/// Errors returned by form operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// One or more required fields are empty.
    #[error("Please fill in all required fields")]
    Incomplete(FieldErrors),

    /// A list field was edited as free text.
    #[error("{0} is chosen from a list")]
    NotText(Field),
}

/// Who the order ships to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub full_name: String,
    /// Read-only; the logged-in customer's username, as the backend has it.
    pub email: Option<String>,
    pub phone: String,
}

/// Everything the checkout page tracks for one visit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutForm {
    pub contact: Contact,
    pub address: AddressSelection,
    pub errors: FieldErrors,
    /// `None` until (and unless) the cart loads.
    pub cart: Option<CartSnapshot>,
}

impl CheckoutForm {
    /// Start a form pre-filled with `contact`. No field is flagged yet.
    #[must_use]
    pub fn new(contact: Contact) -> Self {
        Self {
            contact,
            ..Self::default()
        }
    }

    /// Current value of a text field.
    ///
    /// # Errors
    ///
    /// Returns `FormError::NotText` for list fields.
    pub fn text(&self, field: Field) -> Result<&str, FormError> {
        match field {
            Field::FullName => Ok(&self.contact.full_name),
            Field::Phone => Ok(&self.contact.phone),
            Field::Street => Ok(&self.address.street),
            other => Err(FormError::NotText(other)),
        }
    }

    /// Store a typed value and recompute that field's flag only.
    ///
    /// Returns the new flag.
    ///
    /// # Errors
    ///
    /// Returns `FormError::NotText` for list fields.
    pub fn edit_text(&mut self, field: Field, value: String) -> Result<bool, FormError> {
        let missing = is_blank(&value);
        match field {
            Field::FullName => self.contact.full_name = value,
            Field::Phone => self.contact.phone = value,
            Field::Street => self.address.street = value,
            other => return Err(FormError::NotText(other)),
        }
        self.errors.set(field, missing);
        Ok(missing)
    }

    /// Choose a province and clear its flag.
    pub fn select_province(&mut self, province: Division) -> SelectionTicket {
        let ticket = self.address.select_province(province);
        self.errors.set(Field::Province, false);
        ticket
    }

    /// Choose a district and clear its flag.
    ///
    /// # Errors
    ///
    /// Propagates `SelectionError::ProvinceRequired`.
    pub fn select_district(&mut self, district: Division) -> Result<SelectionTicket, SelectionError> {
        let ticket = self.address.select_district(district)?;
        self.errors.set(Field::District, false);
        Ok(ticket)
    }

    /// Choose a ward and clear its flag.
    ///
    /// # Errors
    ///
    /// Propagates `SelectionError::DistrictRequired`.
    pub fn select_ward(&mut self, ward: Division) -> Result<(), SelectionError> {
        self.address.select_ward(ward)?;
        self.errors.set(Field::Ward, false);
        Ok(())
    }

    /// Recompute every required field's flag at once.
    pub fn validate(&mut self) -> FieldErrors {
        self.errors = FieldErrors {
            full_name: is_blank(&self.contact.full_name),
            phone: is_blank(&self.contact.phone),
            street: is_blank(&self.address.street),
            province: self.address.province().is_none(),
            district: self.address.district().is_none(),
            ward: self.address.ward().is_none(),
        };
        self.errors
    }

    /// Validate and, if nothing is missing, assemble the order draft.
    ///
    /// # Errors
    ///
    /// Returns `FormError::Incomplete` with the flags when any required field
    /// is empty. The flags are also kept on the form for re-rendering.
    pub fn submit(&mut self) -> Result<OrderDraft, FormError> {
        let errors = self.validate();
        if errors.any() {
            return Err(FormError::Incomplete(errors));
        }

        Ok(OrderDraft::assemble(
            &self.contact,
            &self.address,
            self.cart.as_ref(),
        ))
    }
}
