//! HTTP client for the shop backend.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::config::UpstreamConfig;

use super::ShopApiError;
use super::types::{CartSnapshot, LoginRequest, LoginResponse, ProductSummary};

/// Client for the shop backend REST API.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct ShopApiClient {
    inner: Arc<ShopApiClientInner>,
}

struct ShopApiClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl ShopApiClient {
    /// Create a new shop backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &UpstreamConfig) -> Result<Self, ShopApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ShopApiClientInner {
                client,
                base_url: config.shop_api_base_url.clone(),
            }),
        })
    }

    /// Fetch the cart belonging to the bearer token's customer.
    ///
    /// # Errors
    ///
    /// Returns `ShopApiError::Unauthorized` if the token is rejected, or
    /// another error if the request or response parsing fails.
    #[instrument(skip(self, token))]
    pub async fn get_cart(&self, token: &SecretString) -> Result<CartSnapshot, ShopApiError> {
        let url = format!("{}/api/carts", self.inner.base_url);

        let response = self
            .inner
            .client
            .get(&url)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        read_json(response).await
    }

    /// Exchange credentials for a bearer token and profile.
    ///
    /// # Errors
    ///
    /// Returns `ShopApiError::Unauthorized` for bad credentials.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, ShopApiError> {
        let url = format!("{}/api/auth/login", self.inner.base_url);

        let response = self
            .inner
            .client
            .post(&url)
            .json(&LoginRequest {
                username,
                password: password.expose_secret(),
            })
            .send()
            .await?;

        read_json(response).await
    }

    /// Fetch the best-selling products for the homepage.
    ///
    /// # Errors
    ///
    /// Returns error if the request or response parsing fails.
    #[instrument(skip(self))]
    pub async fn best_selling_products(
        &self,
        limit: u32,
    ) -> Result<Vec<ProductSummary>, ShopApiError> {
        let url = format!(
            "{}/api/products/best-selling?limit={limit}",
            self.inner.base_url
        );

        let response = self.inner.client.get(&url).send().await?;

        read_json(response).await
    }
}

/// Check the status and decode a JSON body.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ShopApiError> {
    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(ShopApiError::Unauthorized);
    }

    // Get response body as text first for better error diagnostics
    let body = response.text().await?;

    if !status.is_success() {
        tracing::error!(
            status = %status,
            body = %body.chars().take(500).collect::<String>(),
            "Shop API returned non-success status"
        );
        return Err(ShopApiError::Api {
            status: status.as_u16(),
            message: body.chars().take(200).collect(),
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %body.chars().take(500).collect::<String>(),
            "Failed to parse shop API response"
        );
        ShopApiError::Parse(e)
    })
}
