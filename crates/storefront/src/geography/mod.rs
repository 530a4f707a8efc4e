//! Vietnamese administrative geography lookup.
//!
//! Provinces, districts and wards come from a public reference API
//! (`provinces.open-api.vn` by default). The lists change rarely, so every
//! response is cached in-process via `moka` for the configured TTL.

mod cache;
mod client;
pub mod types;

pub use client::GeographyClient;
pub use types::{Division, Level};

use thiserror::Error;

/// Errors that can occur when looking up divisions.
#[derive(Debug, Error)]
pub enum GeographyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
