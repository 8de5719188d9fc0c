//! Simulated order submission.
//!
//! No payment is taken and nothing is stored: after a fixed processing delay
//! the order is logged, the cart is cleared, and a confirmation is returned.

use std::time::Duration;

use chrono::{DateTime, Utc};
use handicrafts_core::checkout::{OrderSummary, PaymentMethod, ValidCheckout};
use handicrafts_core::{CartManager, Email, KeyValueStore, OrderId};
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

/// Reasons a checkout cannot proceed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,
}

/// Confirmation of a simulated order.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub placed_at: DateTime<Utc>,
    pub customer_name: String,
    pub email: Email,
    pub payment_method: PaymentMethod,
    pub summary: OrderSummary,
}

/// A short, human-friendly order reference such as `HC-1A2B3C4D`.
fn new_order_id() -> OrderId {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(8)
        .collect();
    OrderId::new(format!("HC-{}", suffix.to_uppercase()))
}

/// Wait `delay`, log the order, and clear the cart.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] without waiting when there is nothing
/// to order.
#[instrument(skip_all, fields(customer = %checkout.customer_name))]
pub async fn submit_order<S: KeyValueStore>(
    cart: &mut CartManager<S>,
    checkout: ValidCheckout,
    delay: Duration,
) -> Result<PlacedOrder, CheckoutError> {
    if cart.cart().is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let summary = OrderSummary::from_cart(cart.cart());
    tokio::time::sleep(delay).await;

    let order = PlacedOrder {
        order_id: new_order_id(),
        placed_at: Utc::now(),
        customer_name: checkout.customer_name,
        email: checkout.email,
        payment_method: checkout.payment_method,
        summary,
    };

    tracing::info!(
        order_id = %order.order_id,
        email = %order.email,
        lines = order.summary.lines.len(),
        total = %order.summary.total,
        "Order submitted (simulated, no payment processed)"
    );

    cart.clear();
    Ok(order)
}
