//! Milk Shop Core - Shared types library.
//!
//! This crate provides the domain types shared by the storefront binary and
//! the integration tests:
//! - `storefront` - Public-facing shop (homepage, cart, checkout, payment hand-off)
//! - `integration-tests` - Router and checkout flow tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps it
//! lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices and geography codes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
