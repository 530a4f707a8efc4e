//! Core types for Milk Shop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod division;
pub mod id;
pub mod price;

pub use division::DivisionCode;
pub use id::*;
pub use price::{CurrencyCode, Price};
