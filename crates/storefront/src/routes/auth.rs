//! Authentication route handlers.
//!
//! Credentials are checked by the shop backend; on success the returned
//! token and profile are kept in the session as a [`CurrentCustomer`].

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{clear_current_customer, set_current_customer};
use crate::models::CurrentCustomer;
use crate::shop::ShopApiError;
use crate::state::AppState;

use super::notice::Notice;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: SecretString,
    #[serde(default)]
    pub next: Option<String>,
}

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub customer_name: Option<String>,
    pub notices: Vec<Notice>,
    pub next: String,
}

/// Message for an `?error=` code.
fn error_notice(code: &str) -> Notice {
    match code {
        "credentials" => Notice::error("Invalid username or password"),
        "unavailable" => Notice::error("Login is unavailable right now. Please try again later"),
        _ => Notice::error("Something went wrong. Please try again"),
    }
}

/// Only same-site absolute paths are followed after login.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<LoginQuery>) -> impl IntoResponse {
    LoginTemplate {
        customer_name: None,
        notices: query.error.as_deref().map(error_notice).into_iter().collect(),
        next: safe_next(query.next.as_deref()).to_string(),
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let next = safe_next(form.next.as_deref()).to_string();
    let encoded_next: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
    let retry =
        |code: &str| Redirect::to(&format!("/auth/login?error={code}&next={encoded_next}"));

    let login = match state.shop().login(form.username.trim(), &form.password).await {
        Ok(login) => login,
        Err(ShopApiError::Unauthorized) => {
            tracing::info!("Login rejected");
            return retry("credentials").into_response();
        }
        Err(e) => {
            tracing::warn!("Login failed: {e}");
            return retry("unavailable").into_response();
        }
    };

    let customer = CurrentCustomer::from(login);

    // New identity, new session id
    if let Err(e) = session.cycle_id().await {
        tracing::error!("Failed to cycle session id: {e}");
        return retry("session").into_response();
    }

    if let Err(e) = set_current_customer(&session, &customer).await {
        tracing::error!("Failed to set session: {e}");
        return retry("session").into_response();
    }

    set_sentry_user(&customer.username);
    tracing::info!("Customer logged in");

    Redirect::to(&next).into_response()
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_customer(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }

    // Also drop the checkout id and any pending order draft
    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {e}");
    }

    clear_sentry_user();

    Redirect::to("/").into_response()
}
