//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SHOP_API_BASE_URL` - Shop backend (cart, products, accounts) (default: <http://localhost:8080>)
//! - `GEO_API_BASE_URL` - Province/district/ward lookup (default: <https://provinces.open-api.vn/api>)
//! - `SHOP_IMAGE_ORIGINS` - Comma-separated origins product images load from (default: the shop backend's origin)
//! - `GEO_CACHE_TTL_SECS` - How long geography lists are cached (default: 86400)
//! - `UPSTREAM_TIMEOUT_SECS` - Timeout for upstream HTTP calls (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_SHOP_API_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_GEO_API_BASE_URL: &str = "https://provinces.open-api.vn/api";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Upstream services
    pub upstream: UpstreamConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Upstream HTTP services the storefront talks to.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Shop backend base URL (no trailing slash)
    pub shop_api_base_url: String,
    /// Geography lookup base URL (no trailing slash)
    pub geo_api_base_url: String,
    /// Origins product and cart images are served from, e.g.
    /// `https://cdn.milkshop.vn`. Allowed by the CSP `img-src`.
    pub image_origins: Vec<String>,
    /// TTL for cached province/district/ward lists
    pub geo_cache_ttl: Duration,
    /// Per-request timeout for upstream calls
    pub request_timeout: Duration,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default::<IpAddr>("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("STOREFRONT_PORT", "3000")?;
        let base_url = validate_base_url(
            "STOREFRONT_BASE_URL",
            &get_required_env("STOREFRONT_BASE_URL")?,
        )?;

        Ok(Self {
            host,
            port,
            base_url,
            upstream: UpstreamConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env_or_default("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should be marked `Secure`.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl UpstreamConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let shop_api_base_url = validate_base_url(
            "SHOP_API_BASE_URL",
            &get_env_or_default("SHOP_API_BASE_URL", DEFAULT_SHOP_API_BASE_URL),
        )?;
        let geo_api_base_url = validate_base_url(
            "GEO_API_BASE_URL",
            &get_env_or_default("GEO_API_BASE_URL", DEFAULT_GEO_API_BASE_URL),
        )?;
        let image_origins = match get_optional_env("SHOP_IMAGE_ORIGINS") {
            Some(value) => parse_origins("SHOP_IMAGE_ORIGINS", &value)?,
            None => parse_origins("SHOP_API_BASE_URL", &shop_api_base_url)?,
        };
        let geo_cache_ttl =
            Duration::from_secs(parse_env_or_default("GEO_CACHE_TTL_SECS", "86400")?);
        let request_timeout =
            Duration::from_secs(parse_env_or_default("UPSTREAM_TIMEOUT_SECS", "10")?);

        Ok(Self {
            shop_api_base_url,
            geo_api_base_url,
            image_origins,
            geo_cache_ttl,
            request_timeout,
        })
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            shop_api_base_url: DEFAULT_SHOP_API_BASE_URL.to_string(),
            geo_api_base_url: DEFAULT_GEO_API_BASE_URL.to_string(),
            image_origins: vec![DEFAULT_SHOP_API_BASE_URL.to_string()],
            geo_cache_ttl: Duration::from_secs(86_400),
            request_timeout: Duration::from_secs(10),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate an absolute http(s) URL and strip any trailing slash.
fn validate_base_url(key: &str, value: &str) -> Result<String, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "URL must have a host".to_string(),
        ));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Parse a comma-separated list of URLs into their origins
/// (`scheme://host[:port]`), dropping duplicates.
fn parse_origins(key: &str, value: &str) -> Result<Vec<String>, ConfigError> {
    let mut origins = Vec::new();
    for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let origin = Url::parse(&validate_base_url(key, part)?)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?
            .origin()
            .ascii_serialization();
        if !origins.contains(&origin) {
            origins.push(origin);
        }
    }
    Ok(origins)
}
