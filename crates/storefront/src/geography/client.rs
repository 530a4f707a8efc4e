//! Geography lookup client with an in-process cache.

use std::future::Future;
use std::sync::Arc;

use moka::future::Cache;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use milk_shop_core::DivisionCode;

use crate::config::UpstreamConfig;

use super::GeographyError;
use super::cache::CacheKey;
use super::types::{DistrictDetail, Division, ProvinceDetail};

/// Client for the province/district/ward lookup API.
#[derive(Clone)]
pub struct GeographyClient {
    inner: Arc<GeographyClientInner>,
}

struct GeographyClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<CacheKey, Arc<[Division]>>,
}

impl GeographyClient {
    /// Create a new geography client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &UpstreamConfig) -> Result<Self, GeographyError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        // 63 provinces, ~700 districts: every list fits comfortably
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.geo_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(GeographyClientInner {
                client,
                base_url: config.geo_api_base_url.clone(),
                cache,
            }),
        })
    }

    /// All provinces.
    ///
    /// # Errors
    ///
    /// Returns error if the lookup fails.
    #[instrument(skip(self))]
    pub async fn provinces(&self) -> Result<Arc<[Division]>, GeographyError> {
        let url = format!("{}/p/", self.inner.base_url);
        self.cached(CacheKey::Provinces, || async move {
            self.get_json::<Vec<Division>>(&url).await
        })
        .await
    }

    /// Districts of a province.
    ///
    /// # Errors
    ///
    /// Returns error if the lookup fails.
    #[instrument(skip(self), fields(province_code = %province))]
    pub async fn districts(&self, province: DivisionCode) -> Result<Arc<[Division]>, GeographyError> {
        let url = format!("{}/p/{province}?depth=2", self.inner.base_url);
        self.cached(CacheKey::Districts(province), || async move {
            self.get_json::<ProvinceDetail>(&url)
                .await
                .map(|detail| detail.districts)
        })
        .await
    }

    /// Wards of a district.
    ///
    /// # Errors
    ///
    /// Returns error if the lookup fails.
    #[instrument(skip(self), fields(district_code = %district))]
    pub async fn wards(&self, district: DivisionCode) -> Result<Arc<[Division]>, GeographyError> {
        let url = format!("{}/d/{district}?depth=2", self.inner.base_url);
        self.cached(CacheKey::Wards(district), || async move {
            self.get_json::<DistrictDetail>(&url)
                .await
                .map(|detail| detail.wards)
        })
        .await
    }

    /// Serve from cache, or fetch and remember. Failures are not cached.
    async fn cached<F, Fut>(
        &self,
        key: CacheKey,
        fetch: F,
    ) -> Result<Arc<[Division]>, GeographyError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Division>, GeographyError>>,
    {
        if let Some(cached) = self.inner.cache.get(&key).await {
            debug!(?key, "Cache hit");
            return Ok(cached);
        }

        let divisions: Arc<[Division]> = fetch().await?.into();
        self.inner.cache.insert(key, Arc::clone(&divisions)).await;
        Ok(divisions)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, GeographyError> {
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                url = %url,
                "Geography API returned non-success status"
            );
            return Err(GeographyError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
