//! Checkout route handlers.
//!
//! The page is rendered in full once per visit. After that the checkout
//! script posts single-field edits (answered with JSON) and dropdown changes
//! (answered with the re-rendered address block). The form itself lives in
//! the [`CheckoutStore`](crate::checkout::CheckoutStore); the session only
//! carries its id.

use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use milk_shop_core::DivisionCode;

use crate::checkout::{
    AddressSelection, CheckoutForm, CheckoutId, Field, FieldErrors, FormError, SelectionError,
    SelectionTicket, SharedForm, find_option,
};
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::geography::{Division, GeographyClient, GeographyError, Level};
use crate::middleware::OptionalAuth;
use crate::models::{CurrentCustomer, session_keys};
use crate::state::AppState;

use super::cart::{CartView, load_cart};
use super::notice::Notice;

/// Attempts at rendering option lists that match the selection before
/// giving up on a selection that keeps changing underneath.
const RENDER_ATTEMPTS: usize = 3;

// =============================================================================
// Views
// =============================================================================

/// A text input with its error state.
#[derive(Clone)]
pub struct TextFieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub input_type: &'static str,
    pub value: String,
    pub error: bool,
    pub message: &'static str,
}

impl TextFieldView {
    fn new(form: &CheckoutForm, field: Field) -> Self {
        Self {
            name: field.as_str(),
            label: field.label(),
            input_type: if field == Field::Phone { "tel" } else { "text" },
            value: form.text(field).unwrap_or_default().to_string(),
            error: form.errors.get(field),
            message: field.message(),
        }
    }
}

/// One `<option>` of a division dropdown.
#[derive(Clone)]
pub struct OptionView {
    pub code: String,
    pub name: String,
    pub selected: bool,
}

/// A province, district or ward dropdown.
#[derive(Clone)]
pub struct SelectView {
    pub name: &'static str,
    pub label: &'static str,
    pub options: Vec<OptionView>,
    pub disabled: bool,
    /// Why the dropdown is disabled.
    pub hint: Option<String>,
    pub error: bool,
    pub message: &'static str,
}

/// The three dependent dropdowns, swapped as one fragment.
#[derive(Clone)]
pub struct AddressView {
    pub province: SelectView,
    pub district: SelectView,
    pub ward: SelectView,
    pub notices: Vec<Notice>,
}

const fn field_for(level: Level) -> Field {
    match level {
        Level::Province => Field::Province,
        Level::District => Field::District,
        Level::Ward => Field::Ward,
    }
}

impl AddressView {
    /// Dropdowns in form order.
    #[must_use]
    pub const fn selects(&self) -> [&SelectView; 3] {
        [&self.province, &self.district, &self.ward]
    }

    fn new(
        address: &AddressSelection,
        errors: FieldErrors,
        options: &AddressOptions,
        notice: Option<Notice>,
    ) -> Self {
        let mut notices: Vec<Notice> = notice.into_iter().collect();

        let province = select_view(
            Level::Province,
            Some(&options.provinces),
            address,
            errors,
            &mut notices,
        );
        let district = select_view(
            Level::District,
            options.districts.as_ref().map(|(_, o)| o),
            address,
            errors,
            &mut notices,
        );
        let ward = select_view(
            Level::Ward,
            options.wards.as_ref().map(|(_, o)| o),
            address,
            errors,
            &mut notices,
        );

        Self {
            province,
            district,
            ward,
            notices,
        }
    }
}

/// Build one dropdown. `options` is `None` while the parent is unset.
fn select_view(
    level: Level,
    options: Option<&Options>,
    address: &AddressSelection,
    errors: FieldErrors,
    notices: &mut Vec<Notice>,
) -> SelectView {
    let field = field_for(level);
    let selected = address.at(level).map(|d| d.code);

    let (options, disabled, hint) = match options {
        Some(Ok(divisions)) => (option_views(divisions, selected), false, None),
        Some(Err(e)) => {
            tracing::warn!(level = %level, "Failed to load division list: {e}");
            notices.push(Notice::warning(format!(
                "Could not load the {level} list. Please try again later"
            )));
            (Vec::new(), false, None)
        }
        None => {
            let hint = match level {
                Level::Ward => SelectionError::DistrictRequired,
                _ => SelectionError::ProvinceRequired,
            };
            (Vec::new(), true, Some(hint.to_string()))
        }
    };

    SelectView {
        name: field.as_str(),
        label: field.label(),
        options,
        disabled,
        hint,
        error: errors.get(field),
        message: field.message(),
    }
}

fn option_views(divisions: &[Division], selected: Option<DivisionCode>) -> Vec<OptionView> {
    divisions
        .iter()
        .map(|d| OptionView {
            code: d.code.to_string(),
            name: d.name.clone(),
            selected: Some(d.code) == selected,
        })
        .collect()
}

impl From<SelectionError> for Notice {
    fn from(err: SelectionError) -> Self {
        Self::error(err.to_string())
    }
}

// =============================================================================
// Option Loading
// =============================================================================

type Options = Result<Arc<[Division]>, GeographyError>;

/// Option lists for one snapshot of the selection.
struct AddressOptions {
    provinces: Options,
    districts: Option<(SelectionTicket, Options)>,
    wards: Option<(SelectionTicket, Options)>,
}

impl AddressOptions {
    /// Fetch every list `address` needs, concurrently.
    async fn load(geography: &GeographyClient, address: &AddressSelection) -> Self {
        let (provinces, districts, wards) = tokio::join!(
            geography.provinces(),
            fetch_children(geography, address.pending_ticket(Level::District)),
            fetch_children(geography, address.pending_ticket(Level::Ward)),
        );

        Self {
            provinces,
            districts,
            wards,
        }
    }

    /// Empty lists shaped like `address`, for when loading never settles.
    fn empty_for(address: &AddressSelection) -> Self {
        let empty = || -> Options { Ok(Arc::from(Vec::new())) };
        Self {
            provinces: empty(),
            districts: address
                .pending_ticket(Level::District)
                .map(|t| (t, empty())),
            wards: address.pending_ticket(Level::Ward).map(|t| (t, empty())),
        }
    }

    /// Keep the lists only if they were loaded for the selection `address`
    /// holds now.
    fn accept(self, address: &AddressSelection) -> Result<Self, SelectionError> {
        Ok(Self {
            provinces: self.provinces,
            districts: accept_level(address, Level::District, self.districts)?,
            wards: accept_level(address, Level::Ward, self.wards)?,
        })
    }
}

async fn fetch_children(
    geography: &GeographyClient,
    ticket: Option<SelectionTicket>,
) -> Option<(SelectionTicket, Options)> {
    let ticket = ticket?;
    Some((ticket, fetch_options(geography, ticket).await))
}

async fn fetch_options(geography: &GeographyClient, ticket: SelectionTicket) -> Options {
    match ticket.level() {
        Level::Province => geography.provinces().await,
        Level::District => geography.districts(ticket.parent()).await,
        Level::Ward => geography.wards(ticket.parent()).await,
    }
}

fn accept_level(
    address: &AddressSelection,
    level: Level,
    loaded: Option<(SelectionTicket, Options)>,
) -> Result<Option<(SelectionTicket, Options)>, SelectionError> {
    match (address.pending_ticket(level), loaded) {
        (None, None) => Ok(None),
        (Some(_), Some((ticket, options))) => address
            .accept_options(&ticket, options)
            .map(|options| Some((ticket, options))),
        _ => Err(SelectionError::Stale(level)),
    }
}

/// Render the dropdowns with lists that belong to the current selection.
async fn render_address(
    geography: &GeographyClient,
    form: &SharedForm,
    notice: Option<Notice>,
) -> AddressView {
    let mut address = form.lock().await.address.clone();

    for _ in 0..RENDER_ATTEMPTS {
        let options = AddressOptions::load(geography, &address).await;

        let current = form.lock().await;
        match options.accept(&current.address) {
            Ok(options) => {
                return AddressView::new(&current.address, current.errors, &options, notice);
            }
            Err(e) => {
                tracing::debug!("Discarding option lists: {e}");
                address = current.address.clone();
            }
        }
    }

    let current = form.lock().await;
    let notice = notice.or_else(|| {
        Some(Notice::warning(
            "The address lists are still updating. Please try again",
        ))
    });
    AddressView::new(
        &current.address,
        current.errors,
        &AddressOptions::empty_for(&current.address),
        notice,
    )
}

// =============================================================================
// Session Helpers
// =============================================================================

/// The visitor's form, or a fresh one if it expired or was never started.
async fn current_form(
    state: &AppState,
    session: &Session,
    customer: Option<&CurrentCustomer>,
) -> Result<(CheckoutId, SharedForm), AppError> {
    if let Some(id) = session.get::<CheckoutId>(session_keys::CHECKOUT_ID).await? {
        if let Some(form) = state.checkouts().get(id).await {
            return Ok((id, form));
        }
        tracing::debug!(checkout_id = %id, "Checkout expired, starting over");
    }

    start_form(state, session, new_form(customer)).await
}

fn new_form(customer: Option<&CurrentCustomer>) -> CheckoutForm {
    CheckoutForm::new(customer.map(CurrentCustomer::contact).unwrap_or_default())
}

async fn start_form(
    state: &AppState,
    session: &Session,
    form: CheckoutForm,
) -> Result<(CheckoutId, SharedForm), AppError> {
    let (id, form) = state.checkouts().start(form).await;
    session.insert(session_keys::CHECKOUT_ID, id).await?;
    Ok((id, form))
}

// =============================================================================
// Form Types
// =============================================================================

/// Full-page submit. Dropdown values are already on the server.
#[derive(Debug, Deserialize)]
pub struct CheckoutInput {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub street: String,
}

/// One text field edit.
#[derive(Debug, Deserialize)]
pub struct FieldInput {
    pub field: Field,
    #[serde(default)]
    pub value: String,
}

/// Result of a field edit, consumed by the checkout script.
#[derive(Debug, Serialize)]
pub struct FieldState {
    pub field: Field,
    pub error: bool,
    pub message: &'static str,
}

/// A dropdown change.
#[derive(Debug, Deserialize)]
pub struct SelectInput {
    pub code: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub customer_name: Option<String>,
    pub notices: Vec<Notice>,
    pub full_name: TextFieldView,
    pub email: Option<String>,
    pub phone: TextFieldView,
    pub street: TextFieldView,
    pub address: AddressView,
    pub cart: CartView,
}

impl CheckoutTemplate {
    /// Editable contact and street inputs in form order.
    #[must_use]
    pub const fn text_fields(&self) -> [&TextFieldView; 3] {
        [&self.full_name, &self.phone, &self.street]
    }
}

/// Address dropdowns fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/address_fields.html")]
pub struct AddressFieldsTemplate {
    pub address: AddressView,
}

async fn render_page(
    state: &AppState,
    form: &SharedForm,
    customer: Option<&CurrentCustomer>,
    notices: Vec<Notice>,
) -> CheckoutTemplate {
    let address = render_address(state.geography(), form, None).await;
    let form = form.lock().await;

    CheckoutTemplate {
        customer_name: customer.map(|c| c.display_name().to_string()),
        notices,
        full_name: TextFieldView::new(&form, Field::FullName),
        email: form.contact.email.clone(),
        phone: TextFieldView::new(&form, Field::Phone),
        street: TextFieldView::new(&form, Field::Street),
        address,
        cart: form.cart.as_ref().map_or_else(CartView::empty, CartView::from),
    }
}

// =============================================================================
// Page Routes
// =============================================================================

/// Display the checkout page.
///
/// Every visit starts a new form: contact pre-filled from the logged-in
/// customer, cart loaded once.
#[instrument(skip(state, session, customer))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
) -> Result<CheckoutTemplate, AppError> {
    let (cart, cart_notice) = load_cart(&state, customer.as_ref()).await;

    if let Some(previous) = session.get::<CheckoutId>(session_keys::CHECKOUT_ID).await? {
        state.checkouts().remove(previous).await;
    }

    let mut form = new_form(customer.as_ref());
    form.cart = cart;
    let (_, form) = start_form(&state, &session, form).await?;

    Ok(render_page(&state, &form, customer.as_ref(), cart_notice.into_iter().collect()).await)
}

/// Handle the checkout submit.
///
/// Hands the order draft to the payment step through the session, or
/// re-renders the page with every missing field flagged.
#[instrument(skip(state, session, customer, input))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Form(input): Form<CheckoutInput>,
) -> Result<Response, AppError> {
    let (id, form) = current_form(&state, &session, customer.as_ref()).await?;

    let result = {
        let mut form = form.lock().await;
        form.edit_text(Field::FullName, input.full_name)?;
        form.edit_text(Field::Phone, input.phone)?;
        form.edit_text(Field::Street, input.street)?;
        form.submit()
    };

    match result {
        Ok(draft) => {
            session.insert(session_keys::ORDER_DRAFT, &draft).await?;
            session
                .remove::<CheckoutId>(session_keys::CHECKOUT_ID)
                .await?;
            state.checkouts().remove(id).await;

            tracing::info!(
                checkout_id = %id,
                items = draft.item_count(),
                "Order draft handed to payment"
            );
            Ok(Redirect::to("/payment").into_response())
        }
        Err(FormError::Incomplete(errors)) => {
            tracing::debug!(flagged = ?errors.flagged(), "Checkout blocked");
            let notice = Notice::error(FormError::Incomplete(errors).to_string());
            let page = render_page(&state, &form, customer.as_ref(), vec![notice]).await;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Fragment Routes
// =============================================================================

/// Record one text field and report its flag.
#[instrument(skip(state, session, customer, input), fields(field = %input.field))]
pub async fn field(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Form(input): Form<FieldInput>,
) -> Result<Json<FieldState>, AppError> {
    let (_, form) = current_form(&state, &session, customer.as_ref()).await?;
    let error = form.lock().await.edit_text(input.field, input.value)?;

    Ok(Json(FieldState {
        field: input.field,
        error,
        message: if error { input.field.message() } else { "" },
    }))
}

/// Select a province; districts and wards reset.
#[instrument(skip(state, session, customer))]
pub async fn select_province(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Form(input): Form<SelectInput>,
) -> Result<AddressFieldsTemplate, AppError> {
    select(&state, &session, customer.as_ref(), Level::Province, &input.code).await
}

/// Select a district of the chosen province; ward resets.
#[instrument(skip(state, session, customer))]
pub async fn select_district(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Form(input): Form<SelectInput>,
) -> Result<AddressFieldsTemplate, AppError> {
    select(&state, &session, customer.as_ref(), Level::District, &input.code).await
}

/// Select a ward of the chosen district.
#[instrument(skip(state, session, customer))]
pub async fn select_ward(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Form(input): Form<SelectInput>,
) -> Result<AddressFieldsTemplate, AppError> {
    select(&state, &session, customer.as_ref(), Level::Ward, &input.code).await
}

async fn select(
    state: &AppState,
    session: &Session,
    customer: Option<&CurrentCustomer>,
    level: Level,
    code: &str,
) -> Result<AddressFieldsTemplate, AppError> {
    let (_, form) = current_form(state, session, customer).await?;

    let notice = match choose(state.geography(), &form, level, code).await {
        Ok(Some(ticket)) => {
            tracing::debug!(
                level = %ticket.level(),
                parent = %ticket.parent(),
                "Loading child options"
            );
            None
        }
        Ok(None) => None,
        Err(notice) => Some(notice),
    };

    Ok(AddressFieldsTemplate {
        address: render_address(state.geography(), &form, notice).await,
    })
}

/// Apply a dropdown change if `code` is one of the options offered for the
/// current parent. Leaves the form untouched otherwise.
async fn choose(
    geography: &GeographyClient,
    form: &SharedForm,
    level: Level,
    code: &str,
) -> Result<Option<SelectionTicket>, Notice> {
    let code: DivisionCode = code
        .parse()
        .map_err(|_| Notice::error(format!("Please select a {level} from the list")))?;

    // The list the code must come from, pinned to the current parent
    let parent = {
        let form = form.lock().await;
        match level {
            Level::Province => None,
            Level::District => Some(
                form.address
                    .pending_ticket(level)
                    .ok_or(SelectionError::ProvinceRequired)?,
            ),
            Level::Ward => Some(
                form.address
                    .pending_ticket(level)
                    .ok_or(SelectionError::DistrictRequired)?,
            ),
        }
    };

    let options = match parent {
        Some(ticket) => fetch_options(geography, ticket).await,
        None => geography.provinces().await,
    }
    .map_err(|e| {
        tracing::warn!(level = %level, "Failed to load division list: {e}");
        Notice::warning(format!(
            "Could not load the {level} list. Please try again later"
        ))
    })?;

    let division = find_option(&options, level, code)?;

    let mut form = form.lock().await;
    // The parent changed while the list was loading
    if parent.is_some_and(|ticket| !form.address.is_current(&ticket)) {
        return Err(SelectionError::Stale(level).into());
    }

    add_breadcrumb(
        "checkout",
        "Selected division",
        &[("level", level.as_str()), ("code", &code.to_string())],
    );

    Ok(match level {
        Level::Province => Some(form.select_province(division)),
        Level::District => Some(form.select_district(division)?),
        Level::Ward => {
            form.select_ward(division)?;
            None
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn options(divisions: &[(u32, &str)]) -> Options {
        Ok(divisions
            .iter()
            .map(|&(code, name)| Division::new(code, name))
            .collect::<Vec<_>>()
            .into())
    }

    fn hcm_address() -> AddressSelection {
        let mut address = AddressSelection::default();
        address.select_province(Division::new(79, "Thành phố Hồ Chí Minh"));
        address
    }

    #[test]
    fn test_view_disables_children_until_parent_selected() {
        let address = AddressSelection::default();
        let loaded = AddressOptions {
            provinces: options(&[(1, "Thành phố Hà Nội"), (79, "Thành phố Hồ Chí Minh")]),
            districts: None,
            wards: None,
        };

        let view = AddressView::new(&address, FieldErrors::default(), &loaded, None);

        assert!(!view.province.disabled);
        assert_eq!(view.province.options.len(), 2);
        assert!(view.district.disabled);
        assert_eq!(
            view.district.hint.as_deref(),
            Some("Please select a province first")
        );
        assert!(view.ward.disabled);
        assert_eq!(
            view.ward.hint.as_deref(),
            Some("Please select a district first")
        );
        assert!(view.notices.is_empty());
    }

    #[test]
    fn test_view_marks_selected_option() {
        let address = hcm_address();
        let loaded = AddressOptions {
            provinces: options(&[(1, "Thành phố Hà Nội"), (79, "Thành phố Hồ Chí Minh")]),
            districts: address
                .pending_ticket(Level::District)
                .map(|t| (t, options(&[(760, "Quận 1")]))),
            wards: None,
        };

        let view = AddressView::new(&address, FieldErrors::default(), &loaded, None);

        let selected: Vec<_> = view
            .province
            .options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.code.as_str())
            .collect();
        assert_eq!(selected, vec!["79"]);
        assert!(!view.district.disabled);
        assert!(view.ward.disabled);
    }

    #[test]
    fn test_failed_list_becomes_notice_and_empty_dropdown() {
        let address = hcm_address();
        let loaded = AddressOptions {
            provinces: options(&[(79, "Thành phố Hồ Chí Minh")]),
            districts: address.pending_ticket(Level::District).map(|t| {
                (
                    t,
                    Err(GeographyError::Api {
                        status: 503,
                        message: "unavailable".to_string(),
                    }),
                )
            }),
            wards: None,
        };

        let view = AddressView::new(&address, FieldErrors::default(), &loaded, None);

        assert!(view.district.options.is_empty());
        assert!(!view.district.disabled);
        assert_eq!(view.notices.len(), 1);
        assert!(view.notices[0].message.contains("district"));
    }

    #[test]
    fn test_view_carries_field_flags() {
        let address = AddressSelection::default();
        let errors = FieldErrors {
            province: true,
            ..FieldErrors::default()
        };
        let loaded = AddressOptions::empty_for(&address);

        let view = AddressView::new(&address, errors, &loaded, None);

        assert!(view.province.error);
        assert_eq!(view.province.message, "Please select a province");
        assert!(!view.district.error);
    }

    #[test]
    fn test_lists_for_superseded_selection_are_rejected() {
        let snapshot = hcm_address();
        let loaded = AddressOptions {
            provinces: options(&[]),
            districts: snapshot
                .pending_ticket(Level::District)
                .map(|t| (t, options(&[(760, "Quận 1")]))),
            wards: None,
        };

        let mut current = snapshot;
        current.select_province(Division::new(1, "Thành phố Hà Nội"));

        assert!(matches!(
            loaded.accept(&current),
            Err(SelectionError::Stale(Level::District))
        ));
    }

    #[test]
    fn test_lists_missing_a_level_are_rejected() {
        let loaded = AddressOptions {
            provinces: options(&[]),
            districts: None,
            wards: None,
        };

        assert!(matches!(
            loaded.accept(&hcm_address()),
            Err(SelectionError::Stale(Level::District))
        ));
    }

    #[test]
    fn test_lists_for_current_selection_are_accepted() {
        let address = hcm_address();
        let loaded = AddressOptions::empty_for(&address);
        let accepted = loaded.accept(&address).unwrap();
        assert!(accepted.districts.is_some());
        assert!(accepted.wards.is_none());
    }

    #[test]
    fn test_text_field_view() {
        let mut form = CheckoutForm::default();
        form.edit_text(Field::Phone, " ".to_string()).unwrap();

        let view = TextFieldView::new(&form, Field::Phone);

        assert_eq!(view.name, "phone");
        assert_eq!(view.input_type, "tel");
        assert!(view.error);
        assert_eq!(view.message, "Phone number cannot be empty");
    }
}
