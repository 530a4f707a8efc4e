//! Application state shared across handlers.

use std::sync::Arc;

use crate::checkout::CheckoutStore;
use crate::config::StorefrontConfig;
use crate::geography::{GeographyClient, GeographyError};
use crate::shop::{ShopApiClient, ShopApiError};

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("shop API client: {0}")]
    ShopApi(#[from] ShopApiError),
    #[error("geography client: {0}")]
    Geography(#[from] GeographyError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// configuration, upstream clients and in-progress checkouts.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    shop: ShopApiClient,
    geography: GeographyClient,
    checkouts: CheckoutStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if an upstream HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let shop = ShopApiClient::new(&config.upstream)?;
        let geography = GeographyClient::new(&config.upstream)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                shop,
                geography,
                checkouts: CheckoutStore::default(),
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the shop backend client.
    #[must_use]
    pub fn shop(&self) -> &ShopApiClient {
        &self.inner.shop
    }

    /// Get a reference to the geography lookup client.
    #[must_use]
    pub fn geography(&self) -> &GeographyClient {
        &self.inner.geography
    }

    /// Get a reference to the in-progress checkout forms.
    #[must_use]
    pub fn checkouts(&self) -> &CheckoutStore {
        &self.inner.checkouts
    }
}
