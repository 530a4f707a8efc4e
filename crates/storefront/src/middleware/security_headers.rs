//! Security headers for storefront responses.
//!
//! The storefront serves its own script and stylesheet, posts checkout
//! fragments back to itself, and shows product images from the shop
//! backend's image hosts. The CSP allows exactly that and nothing else.
//!
//! Pages carry the customer's name, phone and address, so they are never
//! cached. Content-hashed assets under `/static/*/derived/` are immutable.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{
        HeaderMap, HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use crate::config::StorefrontConfig;

/// Features the storefront never uses.
const PERMISSIONS_POLICY: &str = "camera=(), microphone=(), geolocation=(), payment=(), \
     usb=(), serial=(), hid=(), bluetooth=(), display-capture=(), \
     publickey-credentials-get=(), browsing-topics=(), interest-cohort=()";

const NO_STORE: &str = "no-store, max-age=0";
const IMMUTABLE: &str = "public, max-age=31536000, immutable";
const REVALIDATE: &str = "no-cache";

/// Precomputed header values, shared by every request.
#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    csp: Arc<HeaderValue>,
}

impl SecurityHeaders {
    /// Build the policy for this deployment.
    ///
    /// `img-src` lists the configured image origins. `connect-src` and
    /// `form-action` stay on `'self'`: the checkout script only posts to
    /// `/checkout/*` and the login form to `/auth/login`.
    #[must_use]
    pub fn new(config: &StorefrontConfig) -> Self {
        let csp = content_security_policy(&config.upstream.image_origins, config.is_secure());
        let csp = HeaderValue::from_str(&csp)
            .unwrap_or_else(|_| HeaderValue::from_static("default-src 'none'"));
        Self { csp: Arc::new(csp) }
    }
}

fn content_security_policy(image_origins: &[String], secure: bool) -> String {
    let mut img_src = String::from("'self'");
    for origin in image_origins {
        img_src.push(' ');
        img_src.push_str(origin);
    }

    let mut csp = format!(
        "default-src 'none'; \
         script-src 'self'; \
         style-src 'self'; \
         img-src {img_src}; \
         connect-src 'self'; \
         form-action 'self'; \
         base-uri 'self'; \
         object-src 'none'; \
         frame-ancestors 'none'"
    );
    if secure {
        csp.push_str("; upgrade-insecure-requests");
    }
    csp
}

/// `Cache-Control` for a request path.
fn cache_control(path: &str) -> &'static str {
    match path.strip_prefix("/static/") {
        Some(asset) if asset.contains("/derived/") => IMMUTABLE,
        Some(_) => REVALIDATE,
        None => NO_STORE,
    }
}

/// Add security headers to every response.
pub async fn security_headers_middleware(
    State(policy): State<SecurityHeaders>,
    request: Request,
    next: Next,
) -> Response {
    let cache = cache_control(request.uri().path());
    let mut response = next.run(request).await;
    apply(response.headers_mut(), &policy, cache);
    response
}

fn apply(headers: &mut HeaderMap, policy: &SecurityHeaders, cache: &'static str) {
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    // Checkout URLs carry nothing sensitive, but the login `next` does
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(CONTENT_SECURITY_POLICY, (*policy.csp).clone());
    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(PERMISSIONS_POLICY),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(cache));
    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );
    // Product images come from CDN hosts that send no CORP header
    headers.insert(
        HeaderName::from_static("cross-origin-embedder-policy"),
        HeaderValue::from_static("credentialless"),
    );
}
