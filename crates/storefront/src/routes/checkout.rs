//! Checkout route handlers.
//!
//! Orders are simulated: a valid form waits out the configured processing
//! delay, logs the order, clears the cart and shows a confirmation.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use handicrafts_core::checkout::{
    CheckoutErrors, CheckoutField, CheckoutForm, OrderSummary, PaymentMethod,
};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::routes::cart::{CartView, load_cart};
use crate::services::{CheckoutError, PlacedOrder, submit_order};
use crate::state::AppState;

/// Validation messages per form field, for templates.
#[derive(Clone, Default)]
pub struct FieldErrors {
    pub first_name: Option<&'static str>,
    pub last_name: Option<&'static str>,
    pub email: Option<&'static str>,
    pub phone: Option<&'static str>,
    pub address: Option<&'static str>,
    pub city: Option<&'static str>,
    pub state: Option<&'static str>,
    pub zip_code: Option<&'static str>,
    pub card_number: Option<&'static str>,
    pub expiry_date: Option<&'static str>,
    pub cvv: Option<&'static str>,
    pub agree_to_terms: Option<&'static str>,
}

impl From<&CheckoutErrors> for FieldErrors {
    fn from(errors: &CheckoutErrors) -> Self {
        use CheckoutField as F;
        Self {
            first_name: errors.get(F::FirstName),
            last_name: errors.get(F::LastName),
            email: errors.get(F::Email),
            phone: errors.get(F::Phone),
            address: errors.get(F::Address),
            city: errors.get(F::City),
            state: errors.get(F::State),
            zip_code: errors.get(F::ZipCode),
            card_number: errors.get(F::CardNumber),
            expiry_date: errors.get(F::ExpiryDate),
            cvv: errors.get(F::Cvv),
            agree_to_terms: errors.get(F::AgreeToTerms),
        }
    }
}

/// Checkout form page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutShowTemplate {
    pub cart_count: u64,
    pub cart: CartView,
    pub form: CheckoutForm,
    pub pay_by_card: bool,
    pub errors: FieldErrors,
    pub has_errors: bool,
}

impl CheckoutShowTemplate {
    fn new(cart: CartView, form: CheckoutForm, errors: &CheckoutErrors) -> Self {
        Self {
            cart_count: cart.item_count,
            cart,
            pay_by_card: form.payment_method == PaymentMethod::Credit,
            form,
            errors: FieldErrors::from(errors),
            has_errors: !errors.is_empty(),
        }
    }
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmation.html")]
pub struct ConfirmationTemplate {
    pub cart_count: u64,
    pub order_id: String,
    pub customer_name: String,
    pub email: String,
    pub payment_method: &'static str,
    pub placed_at: String,
    pub item_count: u64,
    pub total: String,
}

impl From<&PlacedOrder> for ConfirmationTemplate {
    fn from(order: &PlacedOrder) -> Self {
        Self {
            cart_count: 0,
            order_id: order.order_id.to_string(),
            customer_name: order.customer_name.clone(),
            email: order.email.to_string(),
            payment_method: match order.payment_method {
                PaymentMethod::Credit => "Credit Card",
                PaymentMethod::Paypal => "PayPal",
            },
            placed_at: order.placed_at.format("%B %-d, %Y at %H:%M UTC").to_string(),
            item_count: order.summary.lines.iter().map(|l| u64::from(l.quantity)).sum(),
            total: order.summary.display_total().display(),
        }
    }
}

/// Display the checkout form, or send an empty cart back to the cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Response {
    let cart = load_cart(&state, session).await;
    if cart.cart().is_empty() {
        return Redirect::to("/cart").into_response();
    }

    CheckoutShowTemplate::new(
        CartView::from(cart.cart()),
        CheckoutForm::default(),
        &CheckoutErrors::default(),
    )
    .into_response()
}

/// Validate the form and place a simulated order.
///
/// Invalid forms are re-rendered with every error shown and the entered
/// values kept.
///
/// # Errors
///
/// Returns 500 if the emptied cart cannot be written back to the session.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let mut cart = load_cart(&state, session).await;
    if cart.cart().is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let valid = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => {
            tracing::debug!(invalid_fields = errors.len(), "Checkout form rejected");
            let view = CartView::from(cart.cart());
            return Ok(CheckoutShowTemplate::new(view, form, &errors).into_response());
        }
    };

    let summary = OrderSummary::from_cart(cart.cart());
    add_breadcrumb(
        "checkout",
        "Submitting order",
        &[("total", summary.display_total().display().as_str())],
    );

    let delay = state.config().timing.checkout_delay;
    match submit_order(cart.manager(), valid, delay).await {
        Ok(order) => {
            cart.save().await?;
            Ok(ConfirmationTemplate::from(&order).into_response())
        }
        Err(CheckoutError::EmptyCart) => Ok(Redirect::to("/cart").into_response()),
    }
}
