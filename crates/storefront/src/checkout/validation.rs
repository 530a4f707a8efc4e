//! Required-field validation for the checkout form.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A required checkout field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FullName,
    Phone,
    Street,
    Province,
    District,
    Ward,
}

impl Field {
    /// Every field that must be filled before submitting.
    pub const REQUIRED: [Self; 6] = [
        Self::FullName,
        Self::Phone,
        Self::Street,
        Self::Province,
        Self::District,
        Self::Ward,
    ];

    /// Form input name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullName => "full_name",
            Self::Phone => "phone",
            Self::Street => "street",
            Self::Province => "province",
            Self::District => "district",
            Self::Ward => "ward",
        }
    }

    /// Whether the value is typed rather than picked from a list.
    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::FullName | Self::Phone | Self::Street)
    }

    /// Input label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FullName => "Full name",
            Self::Phone => "Phone number",
            Self::Street => "Street address (house number, street name)",
            Self::Province => "Province / City",
            Self::District => "District",
            Self::Ward => "Ward / Commune",
        }
    }

    /// Helper text shown under the input while flagged.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::FullName => "Please enter your full name",
            Self::Phone => "Phone number cannot be empty",
            Self::Street => "Street address cannot be empty",
            Self::Province => "Please select a province",
            Self::District => "Please select a district",
            Self::Ward => "Please select a ward",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-field error flags. `true` means the field is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors {
    pub full_name: bool,
    pub phone: bool,
    pub street: bool,
    pub province: bool,
    pub district: bool,
    pub ward: bool,
}

impl FieldErrors {
    #[must_use]
    pub const fn get(&self, field: Field) -> bool {
        match field {
            Field::FullName => self.full_name,
            Field::Phone => self.phone,
            Field::Street => self.street,
            Field::Province => self.province,
            Field::District => self.district,
            Field::Ward => self.ward,
        }
    }

    pub const fn set(&mut self, field: Field, missing: bool) {
        match field {
            Field::FullName => self.full_name = missing,
            Field::Phone => self.phone = missing,
            Field::Street => self.street = missing,
            Field::Province => self.province = missing,
            Field::District => self.district = missing,
            Field::Ward => self.ward = missing,
        }
    }

    /// Whether any field is flagged.
    #[must_use]
    pub fn any(&self) -> bool {
        Field::REQUIRED.iter().any(|&field| self.get(field))
    }

    /// The flagged fields, in form order.
    #[must_use]
    pub fn flagged(&self) -> Vec<Field> {
        Field::REQUIRED
            .into_iter()
            .filter(|&field| self.get(field))
            .collect()
    }
}

/// A value counts as missing when it is empty after trimming.
#[must_use]
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
